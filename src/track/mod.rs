use crate::msg::{Path, Point, Quaternion};


/// 最近傍のウェイポイントを探索する範囲のデフォルト値です。
pub const DEFAULT_WINDOW: usize = 50;

/// ゴールに到達したとみなす距離 (m) のデフォルト値です。
pub const DEFAULT_GOAL_RADIUS: f64 = 0.5;

impl Quaternion {
  /// Z 軸周りの回転角 (yaw) をラジアンで返します。
  pub fn yaw(&self) -> f64 {
    let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
    let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
    siny_cosp.atan2(cosy_cosp)
  }

  pub fn from_yaw(yaw: f64) -> Quaternion {
    let half = yaw / 2.0;
    Quaternion::new(0.0, 0.0, half.sin(), half.cos())
  }
}

impl Point {
  /// XY 平面上での距離。
  pub fn planar_distance(&self, x: f64, y: f64) -> f64 {
    (self.x - x).hypot(self.y - y)
  }

  pub fn distance(&self, other: &Point) -> f64 {
    let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
    (dx * dx + dy * dy + dz * dz).sqrt()
  }
}

impl Path {
  /// 隣接するウェイポイント間の距離の総和。
  pub fn length(&self) -> f64 {
    self.poses.windows(2).map(|w| w[0].pose.position.distance(&w[1].pose.position)).sum()
  }

  /// 最後のウェイポイントの位置。
  pub fn goal(&self) -> Option<&Point> {
    self.poses.last().map(|pose| &pose.pose.position)
  }

  /// 指定されたインデックス以降のウェイポイントからなる Path を作成します。ヘッダはそのまま引き継ぎます。
  pub fn remaining_from(&self, index: usize) -> Path {
    let poses = self.poses.get(index..).map(|poses| poses.to_vec()).unwrap_or_default();
    Path { header: self.header.clone(), poses }
  }
}

/// ロボットの現在位置に対して Path 上の追従開始位置を更新するトラッカーです。カーソルは更新のたびに最近傍の
/// ウェイポイントへ移動し、次回の探索はカーソルから `window` 個の範囲で行われます。
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
  window: usize,
  goal_radius: f64,
  cursor: usize,
}

impl Default for Tracker {
  fn default() -> Tracker {
    Tracker::new(DEFAULT_WINDOW, DEFAULT_GOAL_RADIUS)
  }
}

impl Tracker {
  pub fn new(window: usize, goal_radius: f64) -> Tracker {
    Tracker { window: window.max(1), goal_radius, cursor: 0 }
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn reset(&mut self) {
    self.cursor = 0;
  }

  /// 位置 `(x, y)` に最も近いウェイポイントへカーソルを進め、そこから先の Path を返します。
  pub fn update(&mut self, path: &Path, x: f64, y: f64) -> Option<Path> {
    let end = std::cmp::min(path.poses.len(), self.cursor.saturating_add(self.window));
    if self.cursor >= end {
      return None;
    }
    let mut nearest = self.cursor;
    let mut min_distance = f64::INFINITY;
    for (i, pose) in path.poses[self.cursor..end].iter().enumerate() {
      let distance = pose.pose.position.planar_distance(x, y);
      if distance < min_distance {
        min_distance = distance;
        nearest = self.cursor + i;
      }
    }
    log::debug!("nearest waypoint: {} ({:.3} m)", nearest, min_distance);
    self.cursor = nearest;
    Some(path.remaining_from(nearest))
  }

  /// 位置 `(x, y)` が Path のゴールから `goal_radius` 未満にある場合 true を返します。
  pub fn goal_reached(&self, path: &Path, x: f64, y: f64) -> bool {
    path.goal().map(|goal| goal.planar_distance(x, y) < self.goal_radius).unwrap_or(false)
  }
}
