/*!
 * Tracer Tests
 */

use memhandle::monitoring::{init_tracing, TraceFormat};
use serial_test::serial;

#[test]
#[serial]
fn test_init_tracing_installs_once() {
    std::env::set_var("MEMHANDLE_TRACE_JSON", "1");
    assert!(init_tracing().is_ok());
    assert!(init_tracing().is_err());
    std::env::remove_var("MEMHANDLE_TRACE_JSON");
}

#[test]
#[serial]
fn test_format_reads_env_value() {
    assert_eq!(TraceFormat::from_env_value(Some("true")), TraceFormat::Json);
    assert_eq!(TraceFormat::from_env_value(Some("yes")), TraceFormat::Compact);
}
