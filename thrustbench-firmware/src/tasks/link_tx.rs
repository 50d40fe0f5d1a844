//! Host link transmit task
//!
//! Drains queued telemetry and heartbeat responses onto the UART, either
//! as framed binary messages or as CSV text for a serial logger.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use thrustbench_protocol::{CsvLog, LinkFormat, StandMessage, MAX_FRAME_SIZE};

use crate::channels::{OUTBOUND_CHANNEL, PONG_REQUEST};

#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx, format: LinkFormat) {
    info!("Link TX task started ({:?})", format);

    let mut seq: u8 = 0;
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let mut csv = CsvLog::new();

    loop {
        let message = match select(OUTBOUND_CHANNEL.receive(), PONG_REQUEST.wait()).await {
            Either::First(message) => message,
            Either::Second(()) => StandMessage::Pong,
        };

        let result = match format {
            LinkFormat::Binary => {
                let len = match message.to_frame(seq).and_then(|frame| frame.encode(&mut buf)) {
                    Ok(len) => len,
                    Err(e) => {
                        warn!("Failed to frame message: {:?}", e);
                        continue;
                    }
                };
                seq = seq.wrapping_add(1);
                tx.write_all(&buf[..len]).await
            }
            LinkFormat::Csv => match csv.render(&message) {
                Ok(Some(line)) => tx.write_all(line.as_bytes()).await,
                Ok(None) => continue,
                Err(_) => {
                    warn!("CSV row did not fit the line buffer");
                    continue;
                }
            },
        };

        if let Err(e) = result {
            warn!("UART write error: {:?}", e);
        }
    }
}
