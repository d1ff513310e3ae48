/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The periodic work performed by the runner binary: one status line per
//! firing, flushed immediately so an observer polling the stream sees it
//! right away.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::scheduler::Work;

/// Build a [`Work`] unit that writes `line` plus `\n` to `writer` and flushes.
///
/// Write failures are logged and otherwise ignored; the scheduler keeps
/// firing.
pub fn status_line<W>(writer: W, line: impl Into<String>) -> Work
where
    W: Write + Send + 'static,
{
    let writer = Mutex::new(writer);
    let line = format!("{}\n", line.into());

    Arc::new(move || {
        let mut w = writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = w.write_all(line.as_bytes()).and_then(|()| w.flush()) {
            error!("Failed to write status line: {}", e);
        }
    })
}
