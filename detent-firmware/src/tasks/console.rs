//! Serial console task
//!
//! Reads command lines from UART0 (GPIO 0/1), hands each command to the
//! coordination task and writes the reply back.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use heapless::String;

use detent_core::console::LineReader;

use crate::channels::{CONSOLE_COMMANDS, CONSOLE_REPLIES};
use crate::contexts::{task_started, CONSOLE_MONITOR};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Longest formatted reply
const REPLY_LEN: usize = 256;

const PROMPT: &[u8] = b"> ";

#[embassy_executor::task]
pub async fn console_task(mut tx: BufferedUartTx, mut rx: BufferedUartRx) {
    info!("Console task started");
    task_started();

    let mut reader = LineReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    CONSOLE_MONITOR.set_running();
    write_bytes(&mut tx, PROMPT).await;

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Console read error: {:?}", e);
                continue;
            }
        };

        if CONSOLE_MONITOR.take_restart() {
            warn!("Console restarting, dropping partial line");
            reader = LineReader::new();
        }

        for &byte in &buf[..n] {
            let Some(command) = reader.push(byte) else {
                continue;
            };
            debug!("Console command: {}", command);

            CONSOLE_COMMANDS.send(command).await;
            let reply = CONSOLE_REPLIES.receive().await;

            let mut text: String<REPLY_LEN> = String::new();
            if write!(text, "{}", reply).is_err() {
                warn!("Console reply truncated");
            }
            write_bytes(&mut tx, text.as_bytes()).await;
            write_bytes(&mut tx, PROMPT).await;
        }
    }
}

async fn write_bytes(tx: &mut BufferedUartTx, bytes: &[u8]) {
    if let Err(e) = tx.write_all(bytes).await {
        warn!("Console write error: {:?}", e);
    }
}
