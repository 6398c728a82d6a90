use std::io;
use std::path::PathBuf;

use dexa::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let dexa_err: Error = io_err.into();

    match dexa_err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ProjectNotFound {
        location: "/tmp/app".to_string(),
        rcfile: ".dexarc".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "The folder \"/tmp/app\" does not contain a dexa project or its \".dexarc\" file cannot be found."
    );

    let err = Error::StackDoesNotExist { name: "foo".to_string() };
    assert_eq!(err.to_string(), "Stack foo does not exist");

    let err = Error::StackAlreadyExists { name: "foo".to_string() };
    assert_eq!(err.to_string(), "Stack foo already exists");

    let err = Error::HookError("boom".to_string());
    assert_eq!(err.to_string(), "Hook execution error: boom");
}

#[test]
fn test_domain_errors() {
    assert!(Error::StackDoesNotExist { name: "foo".to_string() }.is_domain());
    assert!(Error::PredefinedStack { name: "hello-world".to_string() }.is_domain());
    assert!(Error::DestinationAlreadyExists { path: PathBuf::from("a.txt") }.is_domain());
    assert!(Error::InvalidPath { path: "../x".to_string(), source_path: "__name__".to_string() }
        .is_domain());

    let err = Error::InvalidOrigin { origin: "./missing".to_string() };
    assert!(err.is_domain());
    assert_eq!(
        err.to_string(),
        "Stack origin './missing' is neither an existing folder nor a git repository"
    );

    assert!(!Error::HookError("boom".to_string()).is_domain());
    assert!(!Error::IoError(io::Error::other("disk")).is_domain());
}
