use clap::Parser;
use mockall::mock;
use ratescope::plot::{
    BackendFailure, NullSink, PlotError, PlotFrame, PlotHeader, PlotResult, PlotSink, PlotState,
    RecordingSink,
};
use ratescope::report::{DisplayUnit, Role, Session, SessionConfig, Settings};
use ratescope::units::{parse_magnitude, parse_magnitude_int, parse_magnitude_rate, FormatSpec};
use std::io;

mock! {
    pub Sink {}

    impl PlotSink for Sink {
        fn open(&mut self, header: &PlotHeader) -> PlotResult<()>;
        fn render(&mut self, frame: &PlotFrame) -> PlotResult<()>;
        fn hold(&mut self) -> PlotResult<()>;
        fn relabel(&mut self, ylabel: &str) -> PlotResult<()>;
        fn close(&mut self);
    }
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Test helper: one client tick reported as transfer plus rate
fn report_tick<S: PlotSink>(session: &mut Session<S>, bytes: f64) -> (String, String) {
    let transfer = session.format(bytes, FormatSpec::from_char('A'));
    let rate = session.format(bytes, FormatSpec::from_char('a'));
    (transfer.rendered, rate.rendered)
}

fn client_settings(duration: u32) -> Settings {
    Settings {
        role: Role::Client,
        duration,
        unit: DisplayUnit::Giga,
        ..Settings::default()
    }
}

#[test]
fn test_parse_entry_points() {
    assert_eq!(parse_magnitude("64K"), 65_536.0);
    assert_eq!(parse_magnitude_rate("100m"), 100_000_000.0);
    assert_eq!(parse_magnitude_int("1.5M"), 1_572_864);
    assert_eq!(parse_magnitude("junk"), 0.0);
}

#[test]
fn test_render_starts_on_third_sample() {
    let sink = RecordingSink::new();
    let observer = sink.clone();
    let mut session = Session::with_sink(client_settings(60), sink);

    session.format(1.2e9, FormatSpec::from_char('g'));
    session.format(1.1e9, FormatSpec::from_char('g'));
    assert!(!observer.lines().iter().any(|l| l.starts_with("set yrange")));

    session.format(1.15e9, FormatSpec::from_char('g'));
    let lines = observer.lines();
    assert_eq!(
        lines.iter().filter(|l| l.starts_with("set yrange")).count(),
        1
    );
    assert_eq!(lines.last().map(String::as_str), Some("e"));
}

#[test]
fn test_plot_bounds_and_reset() {
    let sink = RecordingSink::new();
    let mut session = Session::with_sink(client_settings(60), sink);

    for gbit in [1.0, 2.0, 3.0, 4.0, 5.0] {
        // gbit / 8 GB per interval
        session.format(gbit * 1e9 / 8.0, FormatSpec::from_char('g'));
    }
    let buffer = session.plot().buffer();
    assert!((buffer.high() - 5.0).abs() < 1e-9);
    assert!((buffer.low().unwrap_or(f64::NAN) - 1.0).abs() < 1e-9);

    session.reset_plot();
    assert_eq!(session.plot().buffer().low(), None);
    assert_eq!(session.plot().buffer().len(), 0);
    assert_eq!(session.plot().state(), PlotState::Closed);
}

#[test]
fn test_unavailable_backend_matches_available_backend() {
    let samples = [1.1 * GIB, 1.2 * GIB, 0.9 * GIB, 1.3 * GIB, 1.0 * GIB];

    let mut with_plot = Session::with_sink(client_settings(5), RecordingSink::new());

    let mut failing = MockSink::new();
    failing.expect_open().times(1).returning(|_| {
        Err(PlotError::Spawn {
            program: "gnuplot".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    });
    failing.expect_close().return_const(());
    failing.expect_render().never();
    failing.expect_hold().never();
    let mut without_plot = Session::with_sink(client_settings(5), failing);

    for &bytes in &samples {
        assert_eq!(
            report_tick(&mut with_plot, bytes),
            report_tick(&mut without_plot, bytes)
        );
    }

    assert_eq!(without_plot.plot().state(), PlotState::Unavailable);
    assert_eq!(with_plot.totals().total(), without_plot.totals().total());
    assert_eq!(with_plot.summary(), without_plot.summary());
    assert_eq!(with_plot.summary().to_string(), without_plot.summary().to_string());
}

#[test]
fn test_broken_pipe_mid_session_keeps_reporting() {
    let mut sink = MockSink::new();
    sink.expect_open().times(1).returning(|_| Ok(()));
    sink.expect_render()
        .returning(|_| Err(PlotError::Pipe(io::Error::from(io::ErrorKind::BrokenPipe))));
    sink.expect_close().times(1).return_const(());

    let mut session = Session::with_sink(client_settings(60), sink);
    for _ in 0..6 {
        let (transfer, rate) = report_tick(&mut session, 1.25e9);
        assert_eq!(transfer, "1.16 GByte");
        assert_eq!(rate, "10.0 Gbit");
    }
    assert_eq!(session.plot().state(), PlotState::Unavailable);
    assert_eq!(session.totals().rates().len(), 6);
}

#[test]
fn test_client_run_to_completion() {
    let sink = RecordingSink::new();
    let observer = sink.clone();
    let mut session = Session::with_sink(client_settings(4), sink);
    session.set_peer_address("10.1.1.1");

    for _ in 0..3 {
        report_tick(&mut session, 1.25e9);
    }
    let lines = observer.lines();
    assert_eq!(lines[0], "set title \"Client - 10.1.1.1\"");
    assert_eq!(lines[1], "set ylabel \"Gbits/Sec\"");
    assert!(lines.contains(&"set xrange [*:*]".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("pause mouse close"));

    let summary = session.summary();
    assert!((summary.total - 3.0 * 1.25e9 / GIB).abs() < 1e-9);
    // ticks 1 and 2 of a 4 second run
    assert!((summary.mean_rate - 20.0 / 4.0).abs() < 1e-9);
}

#[test]
fn test_session_from_config_without_plot() {
    let config = SessionConfig::try_parse_from([
        "ratescope", "--role", "s", "--unit", "M", "--no-plot", "--duration", "3",
    ])
    .unwrap();
    assert!(config.validate().is_ok());

    let mut session = Session::from_config(&config);
    session.format(500.0 * 1024.0 * 1024.0, FormatSpec::from_char('M'));
    session.format(62.5e6, FormatSpec::from_char('m'));

    assert_eq!(session.totals().total(), 500.0);
    assert_eq!(session.plot().state(), PlotState::Closed);
}

#[test]
fn test_null_sink_session() {
    let mut session = Session::with_sink(client_settings(10), NullSink);
    for _ in 0..5 {
        report_tick(&mut session, 1.25e9);
    }
    assert_eq!(session.plot().state(), PlotState::Open);
    assert_eq!(session.plot().buffer().len(), 5);
}

#[test]
fn test_enabling_plot_after_no_plot_start_spawns_program() {
    let config = SessionConfig::try_parse_from([
        "ratescope", "--no-plot", "--plot-program", "ratescope-no-such-plot-program",
    ])
    .unwrap();
    let mut session = Session::from_config(&config);
    report_tick(&mut session, 1.25e9);
    assert_eq!(session.plot().state(), PlotState::Closed);

    session.set_plotting(true);
    let (transfer, rate) = report_tick(&mut session, 1.25e9);
    assert_eq!(transfer, "1.16 GByte");
    assert_eq!(rate, "10.0 Gbit");
    assert_eq!(session.plot().state(), PlotState::Unavailable);
    assert_eq!(session.plot().failure(), Some(BackendFailure::Failed));
}

#[test]
fn test_unknown_format_rejected_on_command_line() {
    let err = SessionConfig::try_parse_from(["ratescope", "--format", "x"]).unwrap_err();
    assert!(err.to_string().contains("invalid format specifier"));
    assert!(SessionConfig::try_parse_from(["ratescope", "--format", "M"]).is_ok());
}
