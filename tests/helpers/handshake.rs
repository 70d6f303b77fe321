use std::sync::{Arc, Mutex};

use boring::ssl::{AlpnError, ExtensionType, SslAcceptor};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::tls::generate_cert_bundle;

const H2_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";
const FRAME_WINDOW_UPDATE: u8 = 0x8;
const FRAME_SETTINGS: u8 = 0x4;
const FLAG_ACK: u8 = 0x1;

/// What the server saw in the client's ClientHello.
#[derive(Debug, Clone, Default)]
pub struct ClientHelloRecord {
    /// Extensions from the probed list that were present.
    pub extensions: Vec<u16>,
    /// `supported_groups` in offer order, GREASE removed.
    pub groups: Vec<u16>,
}

pub fn is_grease(value: u16) -> bool {
    value & 0x0f0f == 0x0a0a && value >> 8 == value & 0xff
}

/// Acceptor that selects `alpn` and records which of `watched` the ClientHello carries.
pub fn recording_acceptor(
    alpn: &'static [u8],
    watched: Vec<u16>,
) -> (SslAcceptor, Vec<u8>, Arc<Mutex<Option<ClientHelloRecord>>>) {
    let (mut builder, ca_cert) = generate_cert_bundle();
    builder.set_alpn_select_callback(move |_, client_protos| {
        boring::ssl::select_next_proto(alpn, client_protos).ok_or(AlpnError::NOACK)
    });

    let record = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&record);
    builder.set_select_certificate_callback(move |hello| {
        let extensions = watched
            .iter()
            .copied()
            .filter(|id| hello.get_extension(ExtensionType::from(*id)).is_some())
            .collect();
        let groups = hello
            .get_extension(ExtensionType::SUPPORTED_GROUPS)
            .map(|data| {
                data.get(2..)
                    .unwrap_or_default()
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .filter(|group| !is_grease(*group))
                    .collect()
            })
            .unwrap_or_default();
        *slot.lock().unwrap() = Some(ClientHelloRecord { extensions, groups });
        Ok(())
    });

    (builder.build(), ca_cert, record)
}

/// Connection-level frames a client sends before its first request.
#[derive(Debug, Clone, Default)]
pub struct ClientPreface {
    /// SETTINGS entries in wire order.
    pub settings: Vec<(u16, u32)>,
    /// Increment of the first connection-level WINDOW_UPDATE.
    pub window_update: Option<u32>,
}

impl ClientPreface {
    /// Akamai-style `id:value;...` rendering of the SETTINGS frame.
    pub fn akamai_settings(&self) -> String {
        self.settings
            .iter()
            .map(|(id, value)| format!("{}:{}", id, value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Accept one TLS connection that negotiates h2 and read the client's
/// SETTINGS and WINDOW_UPDATE frames. The connection is then dropped
/// without a response.
pub async fn capture_h2_preface(acceptor: SslAcceptor) -> (u16, JoinHandle<ClientPreface>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut stream = tokio_boring::accept(&acceptor, tcp).await.unwrap();

        let mut preface = [0u8; 24];
        stream.read_exact(&mut preface).await.unwrap();
        assert_eq!(&preface[..], H2_PREFACE);

        let mut captured = ClientPreface::default();
        while captured.settings.is_empty() || captured.window_update.is_none() {
            let mut header = [0u8; 9];
            stream.read_exact(&mut header).await.unwrap();
            let len = u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
            let stream_id = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);
            let mut payload = vec![0u8; len];
            stream.read_exact(&mut payload).await.unwrap();

            match header[3] {
                FRAME_SETTINGS if header[4] & FLAG_ACK == 0 => {
                    captured.settings = payload
                        .chunks_exact(6)
                        .map(|entry| {
                            (
                                u16::from_be_bytes([entry[0], entry[1]]),
                                u32::from_be_bytes([entry[2], entry[3], entry[4], entry[5]]),
                            )
                        })
                        .collect();
                }
                FRAME_WINDOW_UPDATE if stream_id == 0 => {
                    let raw = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
                    captured.window_update = Some(raw & 0x7fff_ffff);
                }
                _ => {}
            }
        }
        captured
    });

    (port, handle)
}
