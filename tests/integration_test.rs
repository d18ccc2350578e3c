use portpeek::{
    commands::{CheckCommand, ListCommand, SuggestCommand},
    output::Reporter,
    platform::Platform,
    port::{PortProber, Protocol},
    utils::parse_port,
    Error, PortReport, Status,
};
use std::net::TcpListener;

fn prober() -> PortProber {
    PortProber::new(Platform::current(), Protocol::Tcp)
}

#[tokio::test]
async fn test_check_command_with_invalid_input() {
    let report = CheckCommand::execute(&prober(), "abc").await;
    assert_eq!(report.status, Status::Invalid);
    assert_eq!(report.port, None);
    assert!(report.message.unwrap().contains("Invalid port"));

    let report = CheckCommand::execute(&prober(), "70000").await;
    assert_eq!(report.status, Status::Invalid);
}

#[tokio::test]
async fn test_check_command_with_bound_port() {
    let listener = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let report = CheckCommand::execute(&prober(), &port.to_string()).await;
    assert_eq!(report.port, Some(port));
    assert_eq!(report.status, Status::InUse);
}

#[tokio::test]
async fn test_check_command_with_released_port() {
    let port = {
        let listener = TcpListener::bind("0.0.0.0:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let report = CheckCommand::execute(&prober(), &port.to_string()).await;
    assert_eq!(report.port, Some(port));
    // Another process may grab an ephemeral port in between; only reject error states.
    assert!(matches!(report.status, Status::Free | Status::InUse));
}

#[tokio::test]
async fn test_suggest_returns_ascending_free_ports() {
    let start: u16 = 52_000;
    let report = SuggestCommand::execute(&prober(), &start.to_string(), 3).await;
    assert_eq!(report.status, Status::Success);

    let ports = report.ports.expect("suggestions");
    assert!(!ports.is_empty() && ports.len() <= 3);
    assert!(ports[0] >= start);
    assert!(ports.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_suggest_rejects_bad_arguments() {
    let report = SuggestCommand::execute(&prober(), "nope", 3).await;
    assert_eq!(report.status, Status::Error);
    assert_eq!(report.message.as_deref(), Some("Invalid start port"));

    let report = SuggestCommand::execute(&prober(), "3000", 0).await;
    assert_eq!(report.status, Status::Error);
}

#[tokio::test]
async fn test_list_command_handles_missing_tools() {
    let reports = ListCommand::execute(&Platform::current()).await;
    assert!(!reports.is_empty());

    // Either a sorted list of listeners, or a single error/empty-set record.
    let ports: Vec<u16> = reports.iter().filter_map(|report| report.port).collect();
    assert!(ports.windows(2).all(|pair| pair[0] < pair[1]));
    for report in &reports {
        assert!(matches!(
            report.status,
            Status::InUse | Status::Error | Status::Success
        ));
    }
}

#[test]
fn test_reporter_appends_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ports.log");
    let reporter = Reporter::new(false, true, Some(path.clone()));

    reporter.emit(&PortReport::free(8080)).unwrap();
    reporter
        .emit(&PortReport::in_use(3000).with_process(4242, "node"))
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - Port 8080 is free"));
    assert!(lines[1].ends_with(" - Port 3000 is in use by node (PID 4242)"));
}

#[test]
fn test_validation_functions() {
    assert_eq!(parse_port("80").unwrap(), 80);
    assert_eq!(parse_port(" 65535 ").unwrap(), 65535);
    assert!(parse_port("0").is_err());
    assert!(parse_port("65536").is_err());
    assert!("udp".parse::<Protocol>().is_ok());
    assert!("all".parse::<Protocol>().is_err());
}

#[test]
fn test_error_types() {
    let error = Error::ProcessNotFound(8080);
    assert!(error.to_string().contains("8080"));

    let error = Error::CommandFailed("lsof failed".to_string());
    assert!(error.to_string().contains("system tools"));

    let error = Error::InvalidPort("'abc' is not a number".to_string());
    assert!(error.to_string().contains("between 1 and 65535"));
}
