use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path as FsPath;

use crate::loader::{load_paths, save_paths, PathFiles};
use crate::msg::codec::{self, Format};
use crate::Result;


/// フォルダ内の Path ごとに `path{番号}\t{frame_id}\t{姿勢数} poses\t{長さ} m` の 1 行を出力し、出力した行数を返します。
pub fn list<W: Write>(folder: &FsPath, out: &mut W) -> Result<usize> {
  let mut count = 0;
  for (index, path) in PathFiles::new(folder) {
    let path = path?;
    let frame_id = if path.header.frame_id.is_empty() { "-" } else { path.header.frame_id.as_str() };
    writeln!(out, "path{}\t{}\t{} poses\t{:.3} m", index, frame_id, path.poses.len(), path.length())?;
    count += 1;
  }
  Ok(count)
}

/// フォルダ内の Path をまとめて `output` に書き出します。`output` が指定されていない場合は `fallback` に書き出します。
pub fn export<W: Write>(folder: &FsPath, format: Format, output: Option<&FsPath>, fallback: &mut W) -> Result<usize> {
  let paths = load_paths(folder)?;
  match output {
    Some(output) => {
      let mut writer = BufWriter::new(File::create(output)?);
      codec::encode(format, &mut writer, &paths)?;
      writer.flush()?;
      log::info!("{} paths exported to {} as {}", paths.len(), output.display(), format);
    }
    None => {
      codec::encode(format, fallback, &paths)?;
      fallback.flush()?;
    }
  }
  Ok(paths.len())
}

/// まとめて書き出された Path を `path1.json`, `path2.json`, ... としてフォルダに復元します。
pub fn import<R: Read>(input: &mut R, format: Format, folder: &FsPath) -> Result<usize> {
  let paths = codec::decode(format, input)?;
  let files = save_paths(folder, &paths)?;
  log::info!("{} paths imported into {}", files.len(), folder.display());
  Ok(files.len())
}

pub fn import_file(input: &FsPath, format: Format, folder: &FsPath) -> Result<usize> {
  let mut reader = BufReader::new(File::open(input)?);
  import(&mut reader, format, folder)
}
