// logsift - platform/fs.rs
//
// Filesystem access for log loading. The file handle lives only as long
// as the returned reader, so it is released on every exit path.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Open a log file for buffered line reading.
pub fn open_log(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    tracing::trace!(path = %path.display(), "Opened log file");
    Ok(BufReader::new(file))
}

/// Final path component as UTF-8, with invalid sequences replaced.
pub fn file_name_lossy(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
