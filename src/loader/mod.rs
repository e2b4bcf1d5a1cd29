use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path as FsPath, PathBuf};

use crate::error::Error;
use crate::msg::Path;
use crate::Result;


/// 連番で保存された Path ファイルの命名規則です。デフォルトでは `path1.json`, `path2.json`, ... となります。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
  pub prefix: String,
  pub extension: String,
  pub first_index: usize,
}

impl Default for Naming {
  fn default() -> Naming {
    Naming { prefix: "path".to_string(), extension: "json".to_string(), first_index: 1 }
  }
}

impl Naming {
  pub fn file_name(&self, index: usize) -> String {
    format!("{}{}.{}", self.prefix, index, self.extension)
  }

  pub fn file_path(&self, folder: &FsPath, index: usize) -> PathBuf {
    folder.join(self.file_name(index))
  }
}

/// ディレクトリ内の Path ファイルを番号順に読み込むイテレータです。次の番号のファイルが存在しない時点で終了します。
pub struct PathFiles {
  folder: PathBuf,
  naming: Naming,
  next: usize,
  finished: bool,
}

impl PathFiles {
  pub fn new<P: AsRef<FsPath>>(folder: P) -> PathFiles {
    PathFiles::with_naming(folder, Naming::default())
  }

  pub fn with_naming<P: AsRef<FsPath>>(folder: P, naming: Naming) -> PathFiles {
    let next = naming.first_index;
    PathFiles { folder: folder.as_ref().to_path_buf(), naming, next, finished: false }
  }
}

impl Iterator for PathFiles {
  type Item = (usize, Result<Path>);

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }
    let index = self.next;
    let file = self.naming.file_path(&self.folder, index);
    if !file.exists() {
      log::debug!("{} not found, stopping at index {}", file.display(), index);
      self.finished = true;
      return None;
    }
    self.next += 1;
    let result = read_path_file(&file);
    if result.is_err() {
      self.finished = true;
    }
    Some((index, result))
  }
}

/// 指定されたディレクトリから `path1.json`, `path2.json`, ... を順に読み込み `nav_msgs/Path` のリストとして返します。
/// 番号が途切れた時点で読み込みを終了します。ディレクトリが存在しない場合は空のリストを返します。
pub fn load_paths<P: AsRef<FsPath>>(folder: P) -> Result<Vec<Path>> {
  load_paths_with(folder, &Naming::default())
}

pub fn load_paths_with<P: AsRef<FsPath>>(folder: P, naming: &Naming) -> Result<Vec<Path>> {
  let folder = folder.as_ref();
  if !folder.is_dir() {
    log::warn!("path folder does not exist: {}", folder.display());
  }
  let mut paths = Vec::new();
  for (_, path) in PathFiles::with_naming(folder, naming.clone()) {
    paths.push(path?);
  }
  log::info!("{} paths loaded from {}", paths.len(), folder.display());
  Ok(paths)
}

/// Path のリストを `path1.json`, `path2.json`, ... として保存し、書き込んだファイルのパスを返します。
/// 以前に保存された続きの番号のファイルは削除されるため、保存後に `load_paths` すると同じリストが得られます。
pub fn save_paths<P: AsRef<FsPath>>(folder: P, paths: &[Path]) -> Result<Vec<PathBuf>> {
  save_paths_with(folder, &Naming::default(), paths)
}

pub fn save_paths_with<P: AsRef<FsPath>>(folder: P, naming: &Naming, paths: &[Path]) -> Result<Vec<PathBuf>> {
  let folder = folder.as_ref();
  fs::create_dir_all(folder)?;
  let mut files = Vec::with_capacity(paths.len());
  for (i, path) in paths.iter().enumerate() {
    let file = naming.file_path(folder, naming.first_index + i);
    write_path_file(&file, path)?;
    log::debug!("{} poses saved to {}", path.poses.len(), file.display());
    files.push(file);
  }
  remove_stale_files(folder, naming, naming.first_index + paths.len())?;
  Ok(files)
}

/// 指定された番号から連続して存在するファイルを削除します。
fn remove_stale_files(folder: &FsPath, naming: &Naming, from: usize) -> Result<()> {
  let mut index = from;
  loop {
    let file = naming.file_path(folder, index);
    if !file.exists() {
      return Ok(());
    }
    fs::remove_file(&file)?;
    log::debug!("stale path file removed: {}", file.display());
    index += 1;
  }
}

fn read_path_file(file: &FsPath) -> Result<Path> {
  log::debug!("loading {}", file.display());
  let reader = File::open(file).map(BufReader::new).map_err(|err| path_file_error(file, Error::from(err)))?;
  let value: serde_json::Value = serde_json::from_reader(reader).map_err(|err| path_file_error(file, Error::from(err)))?;
  Path::from_json(value).map_err(|err| path_file_error(file, err))
}

fn write_path_file(file: &FsPath, path: &Path) -> Result<()> {
  let mut writer = BufWriter::new(File::create(file)?);
  serde_json::to_writer_pretty(&mut writer, path)?;
  writer.flush()?;
  Ok(())
}

fn path_file_error(file: &FsPath, err: Error) -> Error {
  Error::PathFile { file: file.display().to_string(), message: err.to_string() }
}
