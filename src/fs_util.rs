use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;

use crate::error::JoinError;

pub fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead + Send>, JoinError> {
    if !path.as_std_path().exists() {
        return Err(JoinError::MissingInput(path.to_string()));
    }
    let file =
        fs::File::open(path.as_std_path()).map_err(|err| JoinError::io(path.as_str(), err))?;
    let is_gz = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn write_atomic<F>(dest: &Utf8Path, write: F) -> Result<(), JoinError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let parent = match dest.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| JoinError::Filesystem(err.to_string()))?;
    let temp = tempfile::Builder::new()
        .prefix("midori-join")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| JoinError::Filesystem(err.to_string()))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer).map_err(|err| JoinError::Filesystem(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| JoinError::Filesystem(err.to_string()))?;
    }
    temp.persist(dest.as_std_path())
        .map_err(|err| JoinError::Filesystem(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use camino::Utf8PathBuf;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn read_gzip_named(name: &str) -> String {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join(name)).unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">A.1\nACGT\n").unwrap();
        fs::write(path.as_std_path(), encoder.finish().unwrap()).unwrap();

        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn reads_gzip_transparently() {
        assert_eq!(read_gzip_named("seqs.fasta.gz"), ">A.1\nACGT\n");
    }

    #[test]
    fn gzip_extension_ignores_case() {
        assert_eq!(read_gzip_named("SEQS.FASTA.GZ"), ">A.1\nACGT\n");
        assert_eq!(read_gzip_named("seqs.fasta.Gz"), ">A.1\nACGT\n");
    }

    #[test]
    fn missing_input_is_reported() {
        let err = open_input(Utf8Path::new("does/not/exist.taxon")).err().unwrap();
        assert!(matches!(err, JoinError::MissingInput(_)));
    }

    #[test]
    fn write_atomic_replaces_target() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("out.tsv")).unwrap();
        fs::write(path.as_std_path(), b"old").unwrap();
        write_atomic(&path, |w| w.write_all(b"new")).unwrap();
        assert_eq!(fs::read_to_string(path.as_std_path()).unwrap(), "new");
    }
}
