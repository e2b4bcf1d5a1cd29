use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::Error;
use crate::msg::{read_u32, write_len, Message, Path};
use crate::Result;

pub mod msgpack;

/// 複数の Path をまとめて保存するときのファイル形式です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  /// Path の JSON 表現を要素とする JSON 配列。
  Json,
  /// 要素数 (u32) に続けて ROS1 形式でシリアライズした Path を並べたバイナリ。
  Ros,
  /// 各メッセージのフィールドを宣言順に並べた MessagePack 配列。
  MsgPack,
}

impl Format {
  pub fn name(&self) -> &'static str {
    match self {
      Format::Json => "json",
      Format::Ros => "ros",
      Format::MsgPack => "msgpack",
    }
  }
}

impl Display for Format {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Format {
  type Err = Error;

  fn from_str(name: &str) -> Result<Format> {
    match name.to_ascii_lowercase().as_str() {
      "json" => Ok(Format::Json),
      "ros" => Ok(Format::Ros),
      "msgpack" => Ok(Format::MsgPack),
      _ => Err(Error::UnsupportedFormat { name: name.to_string() }),
    }
  }
}

/// 指定された形式で Path の列を書き出します。
pub fn encode<W: Write>(format: Format, buf: &mut W, paths: &[Path]) -> Result<()> {
  match format {
    Format::Json => serde_json::to_writer_pretty(buf, paths).map_err(Error::from),
    Format::Ros => {
      write_len(buf, paths.len())?;
      for path in paths.iter() {
        path.write_to(buf)?;
      }
      Ok(())
    }
    Format::MsgPack => msgpack::encode(buf, paths),
  }
}

/// 指定された形式で書き出された Path の列を読み込みます。
pub fn decode<R: Read>(format: Format, buf: &mut R) -> Result<Vec<Path>> {
  match format {
    Format::Json => serde_json::from_reader(buf).map_err(Error::from),
    Format::Ros => {
      let length = read_u32(buf)? as usize;
      let mut paths = Vec::with_capacity(std::cmp::min(length, 1024));
      for _ in 0..length {
        paths.push(Path::read_from(buf)?);
      }
      Ok(paths)
    }
    Format::MsgPack => msgpack::decode(buf),
  }
}
