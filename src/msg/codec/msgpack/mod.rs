use std::io::{Read, Write};

use rmp as msgpack;
use rmp::decode::ValueReadError;
use rmp::encode::ValueWriteError;

use crate::error::Error;
use crate::msg::{Header, Path, Point, Pose, PoseStamped, Quaternion, Time};
use crate::Result;

/// 各メッセージをフィールドの宣言順に並べた配列として書き出します。
pub fn encode<W: Write>(buf: &mut W, paths: &[Path]) -> Result<()> {
  write_array_len(buf, paths.len())?;
  for path in paths.iter() {
    write_path(buf, path)?;
  }
  Ok(())
}

pub fn decode<R: Read>(buf: &mut R) -> Result<Vec<Path>> {
  let length = msgpack::decode::read_array_len(buf)?;
  let mut paths = Vec::with_capacity(std::cmp::min(length as usize, 1024));
  for _ in 0..length {
    paths.push(read_path(buf)?);
  }
  Ok(paths)
}

fn write_path<W: Write>(buf: &mut W, path: &Path) -> Result<()> {
  write_array_len(buf, 2)?;
  write_header(buf, &path.header)?;
  write_array_len(buf, path.poses.len())?;
  for pose in path.poses.iter() {
    write_pose_stamped(buf, pose)?;
  }
  Ok(())
}

fn read_path<R: Read>(buf: &mut R) -> Result<Path> {
  expect_array_len(buf, 2)?;
  let header = read_header(buf)?;
  let length = msgpack::decode::read_array_len(buf)?;
  let mut poses = Vec::with_capacity(std::cmp::min(length as usize, 1024));
  for _ in 0..length {
    poses.push(read_pose_stamped(buf)?);
  }
  Ok(Path { header, poses })
}

fn write_header<W: Write>(buf: &mut W, header: &Header) -> Result<()> {
  write_array_len(buf, 3)?;
  msgpack::encode::write_u32(buf, header.seq)?;
  write_array_len(buf, 2)?;
  msgpack::encode::write_u32(buf, header.stamp.secs)?;
  msgpack::encode::write_u32(buf, header.stamp.nsecs)?;
  msgpack::encode::write_str(buf, &header.frame_id)?;
  Ok(())
}

fn read_header<R: Read>(buf: &mut R) -> Result<Header> {
  expect_array_len(buf, 3)?;
  let seq = msgpack::decode::read_u32(buf)?;
  expect_array_len(buf, 2)?;
  let stamp = Time::new(msgpack::decode::read_u32(buf)?, msgpack::decode::read_u32(buf)?)?;
  let frame_id = read_str(buf, "frame_id")?;
  Ok(Header { seq, stamp, frame_id })
}

fn write_pose_stamped<W: Write>(buf: &mut W, pose: &PoseStamped) -> Result<()> {
  write_array_len(buf, 2)?;
  write_header(buf, &pose.header)?;
  write_array_len(buf, 2)?;
  let Point { x, y, z } = pose.pose.position;
  write_f64s(buf, &[x, y, z])?;
  let Quaternion { x, y, z, w } = pose.pose.orientation;
  write_f64s(buf, &[x, y, z, w])
}

fn read_pose_stamped<R: Read>(buf: &mut R) -> Result<PoseStamped> {
  expect_array_len(buf, 2)?;
  let header = read_header(buf)?;
  expect_array_len(buf, 2)?;
  let [x, y, z] = read_f64s::<R, [f64; 3]>(buf)?;
  let [qx, qy, qz, qw] = read_f64s::<R, [f64; 4]>(buf)?;
  let pose = Pose { position: Point::new(x, y, z), orientation: Quaternion::new(qx, qy, qz, qw) };
  Ok(PoseStamped { header, pose })
}

#[inline]
fn write_f64s<W: Write>(buf: &mut W, values: &[f64]) -> Result<()> {
  write_array_len(buf, values.len())?;
  for value in values.iter() {
    msgpack::encode::write_f64(buf, *value)?;
  }
  Ok(())
}

#[inline]
fn read_f64s<R: Read, A: Default + AsMut<[f64]>>(buf: &mut R) -> Result<A> {
  let mut values = A::default();
  expect_array_len(buf, values.as_mut().len() as u32)?;
  for value in values.as_mut().iter_mut() {
    *value = msgpack::decode::read_f64(buf)?;
  }
  Ok(values)
}

#[inline]
fn write_array_len<W: Write>(buf: &mut W, length: usize) -> Result<()> {
  if length > u32::MAX as usize {
    return Err(Error::TooManyElements { length, maximum: u32::MAX as usize });
  }
  msgpack::encode::write_array_len(buf, length as u32)?;
  Ok(())
}

#[inline]
fn expect_array_len<R: Read>(buf: &mut R, expected: u32) -> Result<()> {
  let actual = msgpack::decode::read_array_len(buf)?;
  if actual != expected {
    Err(Error::IllegalArrayLength { actual, expected })
  } else {
    Ok(())
  }
}

#[inline]
fn read_str<R: Read>(buf: &mut R, field: &'static str) -> Result<String> {
  let expected = msgpack::decode::read_str_len(buf)? as u64;
  let mut bytes = Vec::new();
  buf.by_ref().take(expected).read_to_end(&mut bytes)?;
  if (bytes.len() as u64) < expected {
    Err(Error::BufferUnsatisfied)
  } else {
    String::from_utf8(bytes).map_err(|_| Error::IllegalUtf8String { field })
  }
}

impl From<ValueWriteError> for Error {
  fn from(err: ValueWriteError) -> Error {
    match err {
      ValueWriteError::InvalidMarkerWrite(err) | ValueWriteError::InvalidDataWrite(err) => Error::from(err),
    }
  }
}

impl From<ValueReadError> for Error {
  fn from(err: ValueReadError) -> Error {
    match err {
      ValueReadError::InvalidMarkerRead(err) | ValueReadError::InvalidDataRead(err) => Error::from(err),
      ValueReadError::TypeMismatch(marker) => Error::MsgPack { message: format!("unexpected marker: {:?}", marker) },
    }
  }
}
