//! Host link receive task
//!
//! Parses frames from the host and forwards input edges and heartbeats.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use thrustbench_protocol::{FrameParser, HostCommand};

use crate::channels::{INPUT_CHANNEL, PONG_REQUEST};

const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            match parser.feed(byte) {
                Ok(Some(frame)) => match HostCommand::from_frame(&frame) {
                    Ok(command) => handle_command(command),
                    Err(e) => warn!("Unknown host command: {:?}", e),
                },
                Ok(None) => {}
                Err(e) => warn!("Frame parse error: {:?}", e),
            }
        }
    }
}

fn handle_command(command: HostCommand) {
    match command {
        HostCommand::Ping => {
            trace!("PING received");
            PONG_REQUEST.signal(());
        }
        HostCommand::Input(event) => {
            if INPUT_CHANNEL.try_send(event).is_err() {
                warn!("Input channel full, dropping {:?}", event);
            }
        }
    }
}
