// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated delayed-mirror session that exercises the tracing pipeline.
//!
//! Runs a camera session on the harness's virtual clock: the default 3 s
//! delay, a switch to 1 s, a malformed selection that is ignored, and a
//! final clear. Events go to both a
//! [`PrettyPrintSink`](afterimage_debug::pretty::PrettyPrintSink) on stdout
//! and a [`RecorderSink`](afterimage_debug::recorder::RecorderSink), which is
//! then exported as a Chrome trace JSON file. A second session shows the
//! denied-camera path; it is printed but kept out of the export.

use std::fs::File;
use std::io::{BufWriter, Write as _};

use afterimage_core::control::parse_delay;
use afterimage_core::error::CaptureError;
use afterimage_core::geometry::FrameSize;
use afterimage_core::time::Duration;
use afterimage_core::trace::{TraceSink, Tracer};
use afterimage_debug::pretty::PrettyPrintSink;
use afterimage_debug::recorder::RecorderSink;
use afterimage_debug::tee::Tee;
use afterimage_harness::{Session, SyntheticSource};

const CAMERA: FrameSize = FrameSize::new(1280, 720);
const DISPLAY_WIDTH: u32 = 640;

/// Default delay, a switch to 1 s, an ignored selection, then clear.
fn run_camera_session(sink: &mut dyn TraceSink) -> Session {
    let mut session = Session::web(DISPLAY_WIDTH);
    let mut tracer = Tracer::new(sink);

    // The first couple of frames arrive before the camera has decoded
    // anything.
    let camera = SyntheticSource::new(CAMERA).warming_up(2);
    if let Err(e) = session.launch(Ok(camera), &mut tracer) {
        eprintln!("launch failed: {e}");
        return session;
    }
    session.run_for(Duration::from_millis(4_000), &mut tracer);

    let stats = session.app().mirror().stats();
    println!(
        "-- 3s delay: buffered={} captured={} drawn={} skipped={} missed={}",
        session.app().mirror().buffered(),
        stats.captured,
        stats.drawn,
        stats.skipped,
        stats.missed,
    );

    if let Err(e) = session
        .app_mut()
        .select_delay(parse_delay("1000"), &mut tracer)
    {
        eprintln!("restart failed: {e}");
    }
    session.run_for(Duration::from_millis(2_000), &mut tracer);

    // Ignored; the 1s session keeps running.
    if let Err(e) = session
        .app_mut()
        .select_delay(parse_delay("soon"), &mut tracer)
    {
        eprintln!("restart failed: {e}");
    }
    session.run_for(Duration::from_millis(500), &mut tracer);

    let stats = session.app().mirror().stats();
    println!(
        "-- 1s delay: buffered={} captured={} drawn={} skipped={}",
        session.app().mirror().buffered(),
        stats.captured,
        stats.drawn,
        stats.skipped,
    );

    session.app_mut().clear(&mut tracer);
    session
}

/// A session whose camera request is refused.
fn run_denied_session(sink: &mut dyn TraceSink) -> Session {
    let mut denied = Session::web(DISPLAY_WIDTH);
    let mut tracer = Tracer::new(sink);
    let refused = Err(CaptureError::from_name("NotAllowedError"));
    if let Err(e) = denied.launch(refused, &mut tracer) {
        println!("-- denied: {e}");
    }
    denied
}

fn main() -> std::io::Result<()> {
    let mut sinks = Tee(
        PrettyPrintSink::new(Box::new(std::io::stdout())),
        RecorderSink::new(),
    );
    let session = run_camera_session(&mut sinks);

    // Its virtual clock starts over at zero, so it stays out of the recording.
    let denied = run_denied_session(&mut PrettyPrintSink::new(Box::new(std::io::stdout())));
    for message in denied.notifications() {
        println!("-- alert: {}", message.replace('\n', " | "));
    }

    let Tee(_, recorder) = sinks;

    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    afterimage_debug::chrome::export(recorder.as_bytes(), &mut writer)?;
    writer.flush()?;

    println!(
        "Wrote {path} ({} ticks simulated)",
        session.outcomes().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use afterimage_debug::recorder::{RecordedEvent, decode};

    #[test]
    fn recorded_session_never_goes_back_in_time() {
        let mut recorder = RecorderSink::new();
        let _session = run_camera_session(&mut recorder);

        let times: Vec<_> = decode(recorder.as_bytes()).map(|e| e.at()).collect();
        assert!(!times.is_empty(), "the session recorded nothing");
        assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "timestamps must be non-decreasing"
        );
    }

    #[test]
    fn denied_session_records_only_the_error() {
        let mut recorder = RecorderSink::new();
        let denied = run_denied_session(&mut recorder);

        let events: Vec<_> = decode(recorder.as_bytes()).collect();
        assert_eq!(events.len(), 1, "got: {events:?}");
        assert!(
            matches!(&events[0], RecordedEvent::CaptureError { error, .. } if error.name() == "NotAllowedError"),
            "got: {events:?}"
        );
        assert_eq!(denied.notifications().len(), 1);
    }
}
