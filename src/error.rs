use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
  #[error("should receive more data to restore the entire message")]
  BufferUnsatisfied,

  #[error("illegal UTF-8 string in field: {field}")]
  IllegalUtf8String { field: &'static str },
  #[error("illegal array length: {actual}, expected={expected}")]
  IllegalArrayLength { actual: u32, expected: u32 },
  #[error("too many elements to serialize: {length:?}, max={maximum:?}")]
  TooManyElements { length: usize, maximum: usize },
  #[error("time out of range: {secs} seconds")]
  TimeOutOfRange { secs: u64 },
  #[error("unsupported format: {name}")]
  UnsupportedFormat { name: String },

  #[error("malformed JSON at line {line}, column {column}: {message}")]
  Json { line: usize, column: usize, message: String },
  #[error("malformed MessagePack: {message}")]
  MsgPack { message: String },
  #[error("failed to load {file}: {message}")]
  PathFile { file: String, message: String },

  #[error("underlying I/O layer error: {message}")]
  Io { kind: std::io::ErrorKind, message: String },
}

impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
      Error::BufferUnsatisfied
    } else {
      Error::Io { kind: err.kind(), message: err.to_string() }
    }
  }
}

impl From<serde_json::Error> for Error {
  fn from(err: serde_json::Error) -> Error {
    if err.is_io() {
      Error::from(std::io::Error::from(err))
    } else {
      Error::Json { line: err.line(), column: err.column(), message: err.to_string() }
    }
  }
}
