use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::game::{ClientMessage, GameTx, ServerMessage};
use crate::net::protocol::{MessageHeader, HEADER_LEN};

/// Runs a single raw-TCP connection: frame reads into the game loop, frames from
/// the game loop onto the socket. Each connection is two tasks (read/write) raced
/// with the first to finish triggering a disconnect notification for the other.
pub async fn handle_connection(
    stream: TcpStream,
    conn_id: u64,
    game_tx: GameTx,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let (mut read_half, mut write_half) = stream.into_split();

    let game_tx_clone = game_tx.clone();
    let read_task = tokio::spawn(async move {
        loop {
            let mut header_buf = [0u8; HEADER_LEN];
            if read_half.read_exact(&mut header_buf).await.is_err() {
                break;
            }
            let header = match MessageHeader::from_bytes(&header_buf) {
                Ok(h) => h,
                Err(e) => {
                    warn!("conn {conn_id}: bad header: {e}");
                    break;
                }
            };
            let mut payload = vec![0u8; header.payload_size as usize];
            if !payload.is_empty() && read_half.read_exact(&mut payload).await.is_err() {
                break;
            }
            let mut frame = header_buf.to_vec();
            frame.extend_from_slice(&payload);
            if game_tx_clone
                .send(ClientMessage {
                    conn_id,
                    data: frame,
                })
                .is_err()
            {
                break;
            }
        }
    });

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write_half.write_all(&msg.data).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = read_task => {}
        _ = write_task => {}
    }

    // Sentinel: an empty-kind frame too short to be a real header signals disconnect.
    let _ = game_tx.send(ClientMessage {
        conn_id,
        data: Vec::new(),
    });

    info!("Connection {conn_id} closed");
}
