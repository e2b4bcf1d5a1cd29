use std::convert::TryFrom;
use std::fmt::Formatter;
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::de::value::MapAccessDeserializer;
use serde::de::{Error as DeError, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::Error;
use super::Result;

pub mod codec;
#[cfg(test)]
mod test;

/// 1 秒あたりのナノ秒数です。
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// ROS1 のシリアライズ形式で読み書きすることのできるメッセージです。
pub trait Message: Sized {
  /// `nav_msgs/Path` のようなパッケージ名付きのメッセージ型名。
  const TYPE_NAME: &'static str;

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()>;
  fn read_from<R: Read>(buf: &mut R) -> Result<Self>;
}

/// ROS の `time` 型。`nsecs` は常に 10 億未満に正規化されています。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Time {
  pub secs: u32,
  pub nsecs: u32,
}

impl Time {
  /// 10 億以上の `nsecs` は秒に繰り上げます。
  pub fn new(secs: u32, nsecs: u32) -> Result<Time> {
    let carry = nsecs / NANOS_PER_SEC;
    match secs.checked_add(carry) {
      Some(secs) => Ok(Time { secs, nsecs: nsecs % NANOS_PER_SEC }),
      None => Err(Error::TimeOutOfRange { secs: secs as u64 + carry as u64 }),
    }
  }

  /// ローカル実行環境の現在時刻を参照します。
  pub fn now() -> Result<Time> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = u32::try_from(elapsed.as_secs()).map_err(|_| Error::TimeOutOfRange { secs: elapsed.as_secs() })?;
    Ok(Time { secs, nsecs: elapsed.subsec_nanos() })
  }

  pub fn as_secs_f64(&self) -> f64 {
    self.secs as f64 + self.nsecs as f64 / NANOS_PER_SEC as f64
  }

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_u32(buf, self.secs)?;
    write_u32(buf, self.nsecs)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Time> {
    Ok(Time { secs: read_u32(buf)?, nsecs: read_u32(buf)? })
  }
}

impl<'de> Deserialize<'de> for Time {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Time, D::Error> {
    #[derive(Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct Fields {
      secs: u32,
      nsecs: u32,
    }

    match serde_json::Value::deserialize(deserializer)? {
      serde_json::Value::String(keyword) if keyword == "now" => Time::now().map_err(D::Error::custom),
      serde_json::Value::String(keyword) => Err(D::Error::custom(format!("unknown time keyword: {:?}", keyword))),
      value @ serde_json::Value::Object(_) => {
        let Fields { secs, nsecs } = serde_json::from_value(value).map_err(D::Error::custom)?;
        Time::new(secs, nsecs).map_err(D::Error::custom)
      }
      value => Err(D::Error::custom(format!("invalid time: {}, expected an object or \"now\"", value))),
    }
  }
}

/// 導出した `Serialize`/`Deserialize` を `#[serde(remote = "Self")]` の関連関数として持つメッセージに対して、
/// JSON のオブジェクトのみを受け付けるトレイト実装を定義します。導出した実装のままでは配列も受け付けてしまいます。
macro_rules! object_message {
  ($name:ident) => {
    impl Serialize for $name {
      fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        $name::serialize(self, serializer)
      }
    }

    impl<'de> Deserialize<'de> for $name {
      fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<$name, D::Error> {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
          type Value = $name;

          fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "a {} object", <$name as Message>::TYPE_NAME)
          }

          fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<$name, A::Error> {
            $name::deserialize(MapAccessDeserializer::new(map))
          }
        }

        deserializer.deserialize_map(ObjectVisitor)
      }
    }
  };
}

/// `std_msgs/Header`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct Header {
  /// 送信者が連番を振るためのシーケンス番号。
  pub seq: u32,
  pub stamp: Time,
  /// このメッセージの座標が属する座標系の名前。
  pub frame_id: String,
}

impl Header {
  pub fn new(seq: u32, stamp: Time, frame_id: &str) -> Header {
    Header { seq, stamp, frame_id: frame_id.to_string() }
  }
}

object_message!(Header);

impl Message for Header {
  const TYPE_NAME: &'static str = "std_msgs/Header";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_u32(buf, self.seq)?;
    self.stamp.write_to(buf)?;
    write_string(buf, &self.frame_id)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Header> {
    Ok(Header { seq: read_u32(buf)?, stamp: Time::read_from(buf)?, frame_id: read_string(buf, "frame_id")? })
  }
}

/// `geometry_msgs/Point`
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct Point {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

impl Point {
  pub fn new(x: f64, y: f64, z: f64) -> Point {
    Point { x, y, z }
  }
}

object_message!(Point);

impl Message for Point {
  const TYPE_NAME: &'static str = "geometry_msgs/Point";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_f64(buf, self.x)?;
    write_f64(buf, self.y)?;
    write_f64(buf, self.z)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Point> {
    Ok(Point { x: read_f64(buf)?, y: read_f64(buf)?, z: read_f64(buf)? })
  }
}

/// `geometry_msgs/Quaternion`。ROS のメッセージと同様にデフォルト値はすべての成分が 0 の四元数であり、
/// 単位四元数ではありません。
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct Quaternion {
  pub x: f64,
  pub y: f64,
  pub z: f64,
  pub w: f64,
}

impl Quaternion {
  pub fn new(x: f64, y: f64, z: f64, w: f64) -> Quaternion {
    Quaternion { x, y, z, w }
  }
}

object_message!(Quaternion);

impl Message for Quaternion {
  const TYPE_NAME: &'static str = "geometry_msgs/Quaternion";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    write_f64(buf, self.x)?;
    write_f64(buf, self.y)?;
    write_f64(buf, self.z)?;
    write_f64(buf, self.w)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Quaternion> {
    Ok(Quaternion { x: read_f64(buf)?, y: read_f64(buf)?, z: read_f64(buf)?, w: read_f64(buf)? })
  }
}

/// `geometry_msgs/Pose`
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct Pose {
  pub position: Point,
  pub orientation: Quaternion,
}

object_message!(Pose);

impl Message for Pose {
  const TYPE_NAME: &'static str = "geometry_msgs/Pose";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.position.write_to(buf)?;
    self.orientation.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Pose> {
    Ok(Pose { position: Point::read_from(buf)?, orientation: Quaternion::read_from(buf)? })
  }
}

/// `geometry_msgs/PoseStamped`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct PoseStamped {
  pub header: Header,
  pub pose: Pose,
}

object_message!(PoseStamped);

impl Message for PoseStamped {
  const TYPE_NAME: &'static str = "geometry_msgs/PoseStamped";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.header.write_to(buf)?;
    self.pose.write_to(buf)
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<PoseStamped> {
    Ok(PoseStamped { header: Header::read_from(buf)?, pose: Pose::read_from(buf)? })
  }
}

/// `nav_msgs/Path`。ロボットが追従する姿勢の列を表します。
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, deny_unknown_fields)]
pub struct Path {
  pub header: Header,
  pub poses: Vec<PoseStamped>,
}

impl Path {
  pub fn new(header: Header, poses: Vec<PoseStamped>) -> Path {
    Path { header, poses }
  }

  /// JSON のオブジェクトを `nav_msgs/Path` に変換します。存在しないフィールドはデフォルト値となり、
  /// 未知のフィールドや型の合わないフィールドはエラーとなります。
  pub fn from_json(value: serde_json::Value) -> Result<Path> {
    serde_json::from_value(value).map_err(Error::from)
  }

  pub fn to_json(&self) -> Result<serde_json::Value> {
    serde_json::to_value(self).map_err(Error::from)
  }
}

object_message!(Path);

impl Message for Path {
  const TYPE_NAME: &'static str = "nav_msgs/Path";

  fn write_to<W: Write>(&self, buf: &mut W) -> Result<()> {
    self.header.write_to(buf)?;
    write_len(buf, self.poses.len())?;
    for pose in self.poses.iter() {
      pose.write_to(buf)?;
    }
    Ok(())
  }

  fn read_from<R: Read>(buf: &mut R) -> Result<Path> {
    let header = Header::read_from(buf)?;
    let length = read_u32(buf)? as usize;
    // 不正な長さで巨大な領域を確保しないように上限を設ける
    let mut poses = Vec::with_capacity(std::cmp::min(length, 1024));
    for _ in 0..length {
      poses.push(PoseStamped::read_from(buf)?);
    }
    Ok(Path { header, poses })
  }
}

#[inline]
pub(crate) fn write_len<W: Write>(buf: &mut W, length: usize) -> Result<()> {
  if length > u32::MAX as usize {
    Err(Error::TooManyElements { length, maximum: u32::MAX as usize })
  } else {
    write_u32(buf, length as u32)
  }
}

#[inline]
pub(crate) fn write_u32<W: Write>(buf: &mut W, value: u32) -> Result<()> {
  buf.write_u32::<LittleEndian>(value).map_err(Error::from)
}

#[inline]
pub(crate) fn read_u32<R: Read>(buf: &mut R) -> Result<u32> {
  buf.read_u32::<LittleEndian>().map_err(Error::from)
}

#[inline]
fn write_f64<W: Write>(buf: &mut W, value: f64) -> Result<()> {
  buf.write_f64::<LittleEndian>(value).map_err(Error::from)
}

#[inline]
fn read_f64<R: Read>(buf: &mut R) -> Result<f64> {
  buf.read_f64::<LittleEndian>().map_err(Error::from)
}

#[inline]
fn write_string<W: Write>(buf: &mut W, value: &str) -> Result<()> {
  write_len(buf, value.len())?;
  buf.write_all(value.as_bytes()).map_err(Error::from)
}

#[inline]
fn read_string<R: Read>(buf: &mut R, field: &'static str) -> Result<String> {
  let expected = read_u32(buf)? as u64;
  let mut bytes = Vec::new();
  buf.by_ref().take(expected).read_to_end(&mut bytes)?;
  if (bytes.len() as u64) < expected {
    Err(Error::BufferUnsatisfied)
  } else {
    String::from_utf8(bytes).map_err(|_| Error::IllegalUtf8String { field })
  }
}
