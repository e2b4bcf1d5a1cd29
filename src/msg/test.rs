use std::io::Cursor;

use serde_json::json;

use crate::error::Error;
use crate::msg::{Header, Message, Path, Point, Pose, PoseStamped, Quaternion, Time};
use crate::test::SampleValues;

#[test]
fn test_new_time() {
  // 10 億以上のナノ秒は秒に繰り上がる
  assert_eq!(Time { secs: 3, nsecs: 500 }, Time::new(1, 2_000_000_500).unwrap());
  assert_eq!(Time { secs: 0, nsecs: 999_999_999 }, Time::new(0, 999_999_999).unwrap());
  assert_eq!(Err(Error::TimeOutOfRange { secs: u32::MAX as u64 + 1 }), Time::new(u32::MAX, 1_000_000_000));

  assert_eq!(1.5, Time::new(1, 500_000_000).unwrap().as_secs_f64());
  assert!(Time::now().unwrap().secs > 0);
}

#[test]
fn test_path_from_json() {
  let value = json!({
    "header": { "seq": 7, "stamp": { "secs": 1650000000, "nsecs": 250 }, "frame_id": "map" },
    "poses": [
      {
        "header": { "frame_id": "map" },
        "pose": {
          "position": { "x": 1.5, "y": -2, "z": 0.0 },
          "orientation": { "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }
        }
      },
      { "pose": { "position": { "x": 3.0 } } }
    ]
  });
  let path = Path::from_json(value).unwrap();
  assert_eq!(Header::new(7, Time { secs: 1650000000, nsecs: 250 }, "map"), path.header);
  assert_eq!(2, path.poses.len());

  // 整数は実数のフィールドに設定できる
  assert_eq!(Point::new(1.5, -2.0, 0.0), path.poses[0].pose.position);
  assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 1.0), path.poses[0].pose.orientation);

  // 存在しないフィールドはデフォルト値となる
  assert_eq!(Header::default(), path.poses[1].header);
  assert_eq!(Point::new(3.0, 0.0, 0.0), path.poses[1].pose.position);
  assert_eq!(Quaternion::default(), path.poses[1].pose.orientation);

  // 空のオブジェクトは空の Path となる
  assert_eq!(Path::default(), Path::from_json(json!({})).unwrap());
}

#[test]
fn test_path_from_illegal_json() {
  // 未知のフィールド
  assert!(Path::from_json(json!({ "header": {}, "posess": [] })).is_err());
  assert!(Path::from_json(json!({ "header": { "stamp": { "secs": 1, "msecs": 2 } } })).is_err());

  // 型の合わないフィールド
  assert!(Path::from_json(json!({ "header": { "seq": -1 } })).is_err());
  assert!(Path::from_json(json!({ "header": { "seq": 1.5 } })).is_err());
  assert!(Path::from_json(json!({ "header": { "seq": 4294967296u64 } })).is_err());
  assert!(Path::from_json(json!({ "header": { "frame_id": 10 } })).is_err());
  assert!(Path::from_json(json!({ "poses": {} })).is_err());
  assert!(Path::from_json(json!({ "poses": [{ "pose": { "position": { "x": "1.0" } } }] })).is_err());
  assert!(Path::from_json(json!({ "header": { "stamp": "yesterday" } })).is_err());

  match Path::from_json(json!({ "header": { "seq": "one" } })) {
    Err(Error::Json { .. }) => (),
    unexpected => panic!("unexpected result: {:?}", unexpected),
  }
}

#[test]
fn test_path_from_positional_json() {
  // メッセージはオブジェクトでなければならず、フィールドを位置で並べた配列は受け付けない
  assert!(Path::from_json(json!([{}, []])).is_err());
  assert!(Path::from_json(json!({ "poses": [{ "pose": { "position": [1, 2, 3] } }] })).is_err());
  assert!(Path::from_json(json!({ "header": [1, { "secs": 5 }, "map"] })).is_err());
  assert!(Path::from_json(json!({ "header": { "stamp": [5, 6] } })).is_err());
  assert!(Path::from_json(json!([{ "seq": 1, "stamp": [5, 6], "frame_id": "map" }, [[{}, [[1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]]]]])).is_err());
  assert!(serde_json::from_value::<PoseStamped>(json!({ "pose": [[1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0]] })).is_err());

  match Path::from_json(json!({ "poses": [[]] })) {
    Err(Error::Json { message, .. }) => assert!(message.contains("geometry_msgs/PoseStamped"), "{}", message),
    unexpected => panic!("unexpected result: {:?}", unexpected),
  }
}

#[test]
fn test_illegal_time_in_json() {
  // 範囲外の値はそのフィールドの型を示すエラーとなる
  for stamp in [json!({ "secs": -1 }), json!({ "secs": 1.5 }), json!({ "nsecs": "1" })].iter() {
    match Path::from_json(json!({ "header": { "stamp": stamp } })) {
      Err(Error::Json { message, .. }) => {
        assert!(!message.contains("untagged"), "{}", message);
        assert!(message.contains("u32"), "{}", message);
      }
      unexpected => panic!("unexpected result: {:?}", unexpected),
    }
  }

  match Path::from_json(json!({ "header": { "stamp": { "secs": 1, "msecs": 2 } } })) {
    Err(Error::Json { message, .. }) => assert!(message.contains("msecs"), "{}", message),
    unexpected => panic!("unexpected result: {:?}", unexpected),
  }
  match Path::from_json(json!({ "header": { "stamp": 10 } })) {
    Err(Error::Json { message, .. }) => assert!(message.contains("\"now\""), "{}", message),
    unexpected => panic!("unexpected result: {:?}", unexpected),
  }
}

#[test]
fn test_time_now_in_json() {
  let before = Time::now().unwrap();
  let path = Path::from_json(json!({ "header": { "stamp": "now" } })).unwrap();
  let after = Time::now().unwrap();
  assert!(before <= path.header.stamp && path.header.stamp <= after);

  // ナノ秒は正規化される
  let path = Path::from_json(json!({ "header": { "stamp": { "nsecs": 1_000_000_001u32 } } })).unwrap();
  assert_eq!(Time { secs: 1, nsecs: 1 }, path.header.stamp);
}

#[test]
fn test_path_to_json() {
  let mut sample = SampleValues::new(4890275301u64);
  let path = sample.next_path(8);
  let value = path.to_json().unwrap();
  assert_eq!(json!(path.header.frame_id), value["header"]["frame_id"]);
  assert_eq!(json!(path.header.stamp.nsecs), value["header"]["stamp"]["nsecs"]);
  assert_eq!(8, value["poses"].as_array().unwrap().len());
  assert_eq!(json!(path.poses[3].pose.orientation.w), value["poses"][3]["pose"]["orientation"]["w"]);

  // 変換した JSON から Path を復元できる
  let restored = Path::from_json(value).unwrap();
  assert_eq!(path.header, restored.header);
  assert_eq!(path.poses.len(), restored.poses.len());
  for (expected, actual) in path.poses.iter().zip(restored.poses.iter()) {
    assert_eq!(expected.header, actual.header);
    assert!((expected.pose.position.x - actual.pose.position.x).abs() < 1e-9);
    assert!((expected.pose.orientation.w - actual.pose.orientation.w).abs() < 1e-9);
  }
}

#[test]
fn test_ros_serialization_layout() {
  let pose = PoseStamped {
    header: Header::new(1, Time { secs: 2, nsecs: 3 }, "ab"),
    pose: Pose { position: Point::new(1.0, 0.0, 0.0), orientation: Quaternion::new(0.0, 0.0, 0.0, 1.0) },
  };
  let path = Path::new(Header::new(9, Time::default(), ""), vec![pose]);
  let mut buffer = Vec::new();
  path.write_to(&mut buffer).unwrap();

  // header(4 + 8 + 4) + 要素数(4) + header(4 + 8 + 4 + 2) + pose(7 * 8)
  assert_eq!(16 + 4 + 18 + 56, buffer.len());
  assert_eq!(&[9u8, 0, 0, 0], &buffer[0..4]);
  assert_eq!(&[1u8, 0, 0, 0], &buffer[16..20]);
  assert_eq!(&[2u8, 0, 0, 0, b'a', b'b'], &buffer[32..38]);
  assert_eq!(&1.0f64.to_le_bytes(), &buffer[38..46]);
  assert_eq!(&1.0f64.to_le_bytes(), &buffer[buffer.len() - 8..]);

  assert_eq!(path, Path::read_from(&mut Cursor::new(buffer)).unwrap());
}

#[test]
fn test_ros_deserialization_failure() {
  let mut sample = SampleValues::new(7304895621u64);
  let path = sample.next_path(4);
  let mut buffer = Vec::new();
  path.write_to(&mut buffer).unwrap();

  // 途中で途切れたデータ
  for length in [0usize, 3, 15, 30, buffer.len() - 1].iter() {
    let result = Path::read_from(&mut Cursor::new(&buffer[..*length]));
    assert_eq!(Err(Error::BufferUnsatisfied), result);
  }

  // 文字列として不正なバイト列
  let mut buffer = Vec::new();
  Header::new(0, Time::default(), "x").write_to(&mut buffer).unwrap();
  let last = buffer.len() - 1;
  buffer[last] = 0xFF;
  assert_eq!(Err(Error::IllegalUtf8String { field: "frame_id" }), Header::read_from(&mut Cursor::new(buffer)));

  // 要素数だけが大きい
  let mut buffer = Vec::new();
  Header::default().write_to(&mut buffer).unwrap();
  buffer.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
  assert_eq!(Err(Error::BufferUnsatisfied), Path::read_from(&mut Cursor::new(buffer)));
}

#[test]
fn test_type_names() {
  assert_eq!("nav_msgs/Path", Path::TYPE_NAME);
  assert_eq!("geometry_msgs/PoseStamped", PoseStamped::TYPE_NAME);
  assert_eq!("std_msgs/Header", Header::TYPE_NAME);
}
