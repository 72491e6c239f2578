use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use num_traits::{PrimInt, Unsigned};

use crate::consts::{COVERAGE_COLUMN, DELIMITER, LENGTH_COLUMN, POSITION_COLUMN, START_COLUMN};
use crate::errors::ReadSetError;
use crate::models::{Locus, Read as SeqRead};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>, ReadSetError> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)
        .map_err(|e| ReadSetError::FileReadError(format!("{}: {}", path.display(), e)))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

/// Get a reader for either a gzipped, non-gzipped file, or stdin
///
/// # Arguments
///
/// - path: path to the file to read, or '-' for stdin
pub fn get_dynamic_reader_w_stdin(path: &Path) -> Result<BufReader<Box<dyn Read>>, ReadSetError> {
    if path == Path::new("-") {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        get_dynamic_reader(path)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Position of `column` in the header, ignoring case.
fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    source: &str,
) -> Result<usize, ReadSetError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| ReadSetError::MissingColumn {
            column: column.to_string(),
            file: source.to_string(),
        })
}

fn parse_field<I>(record: &csv::StringRecord, idx: usize, column: &str) -> Result<I, ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync,
{
    let line = record.position().map_or(0, |p| p.line() as usize);
    let raw = record.get(idx).ok_or_else(|| ReadSetError::ParseError {
        line,
        reason: format!("missing `{}` field", column),
    })?;

    I::from_str_radix(raw, 10).map_err(|_| ReadSetError::ParseError {
        line,
        reason: format!("invalid integer `{}` in column `{}`", raw, column),
    })
}

/// Look up `columns` in the header of `reader`, then hand each non-blank record
/// to `f` together with the column positions.
fn for_each_record<R, F>(
    reader: R,
    source: &str,
    columns: &[&str],
    mut f: F,
) -> Result<(), ReadSetError>
where
    R: Read,
    F: FnMut(&csv::StringRecord, &[usize]) -> Result<(), ReadSetError>,
{
    let mut reader = csv_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ReadSetError::EmptyReadSet(source.to_string()));
    }
    let indices = columns
        .iter()
        .map(|c| column_index(&headers, c, source))
        .collect::<Result<Vec<usize>, _>>()?;

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        f(&record, &indices)?;
    }

    Ok(())
}

///
/// Read reads from any delimited source with a header containing `start` and
/// `length` columns. `source` names the input in error messages.
///
/// Column order does not matter and extra columns are ignored. Reads with a zero
/// length are returned as-is; deciding what to do with them is up to the loader.
///
pub fn read_reads_from<I, R>(reader: R, source: &str) -> Result<Vec<SeqRead<I>>, ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync,
    R: Read,
{
    let mut reads = Vec::new();

    for_each_record(reader, source, &[START_COLUMN, LENGTH_COLUMN], |record, idx| {
        let start = parse_field(record, idx[0], START_COLUMN)?;
        let length = parse_field(record, idx[1], LENGTH_COLUMN)?;
        reads.push(SeqRead { start, length });
        Ok(())
    })?;

    if reads.is_empty() {
        return Err(ReadSetError::EmptyReadSet(source.to_string()));
    }

    Ok(reads)
}

///
/// Read a reads file (plain or gzipped), or stdin when `path` is `-`.
///
pub fn read_reads<I, P>(path: P) -> Result<Vec<SeqRead<I>>, ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = get_dynamic_reader_w_stdin(path)?;
    read_reads_from(reader, &path.display().to_string())
}

///
/// Read query positions from any delimited source with a header containing a
/// `position` column.
///
pub fn read_loci_from<I, R>(reader: R, source: &str) -> Result<Vec<I>, ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync,
    R: Read,
{
    let mut positions = Vec::new();

    for_each_record(reader, source, &[POSITION_COLUMN], |record, idx| {
        positions.push(parse_field(record, idx[0], POSITION_COLUMN)?);
        Ok(())
    })?;

    if positions.is_empty() {
        return Err(ReadSetError::EmptyReadSet(source.to_string()));
    }

    Ok(positions)
}

///
/// Read a loci file (plain or gzipped), or stdin when `path` is `-`.
///
pub fn read_loci<I, P>(path: P) -> Result<Vec<I>, ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = get_dynamic_reader_w_stdin(path)?;
    read_loci_from(reader, &path.display().to_string())
}

///
/// Write annotated loci as `position,coverage` rows, in the order given.
/// Unannotated loci get an empty coverage field.
///
pub fn write_loci<I, W>(writer: W, loci: &[Locus<I>]) -> Result<(), ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync + std::fmt::Display,
    W: Write,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    writer.write_record([POSITION_COLUMN, COVERAGE_COLUMN])?;
    for locus in loci {
        let coverage = locus.coverage.map_or(String::new(), |c| c.to_string());
        writer.write_record([locus.position.to_string(), coverage])?;
    }
    writer.flush()?;
    Ok(())
}

///
/// Write annotated loci to a file, or to stdout when `path` is `-`.
///
pub fn write_loci_to<I>(path: &str, loci: &[Locus<I>]) -> Result<(), ReadSetError>
where
    I: PrimInt + Unsigned + Send + Sync + std::fmt::Display,
{
    if path == "-" {
        let stdout = std::io::stdout();
        write_loci(stdout.lock(), loci)
    } else {
        let file = File::create(path)?;
        write_loci(BufWriter::new(file), loci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[fixture]
    fn tempdir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[rstest]
    fn test_read_reads(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "start,length\n1,3\n2,2\n\n5,1\n");
        let reads = read_reads::<u32, _>(&path).unwrap();

        assert_eq!(
            reads,
            vec![SeqRead::new(1, 3), SeqRead::new(2, 2), SeqRead::new(5, 1)]
        );
    }

    #[rstest]
    fn test_read_reads_column_order_and_extra_columns(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "name,length,start\nr1,10,100\nr2,5,7\n");
        let reads = read_reads::<u32, _>(&path).unwrap();

        assert_eq!(reads, vec![SeqRead::new(100, 10), SeqRead::new(7, 5)]);
    }

    #[rstest]
    fn test_read_reads_gzipped(tempdir: TempDir) {
        let path = tempdir.path().join("reads.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"start,length\n10,5\n").unwrap();
        encoder.finish().unwrap();

        let reads = read_reads::<u32, _>(&path).unwrap();
        assert_eq!(reads, vec![SeqRead::new(10, 5)]);
    }

    #[rstest]
    fn test_read_reads_quoted_fields(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "\"start\",\"length\"\n\"1\",\"3\"\n");
        let reads = read_reads::<u32, _>(&path).unwrap();

        assert_eq!(reads, vec![SeqRead::new(1, 3)]);
    }

    #[rstest]
    fn test_read_reads_from_reader_trims_and_ignores_case() {
        let input = "Start , LENGTH\r\n 10 , 5 \r\n";
        let reads = read_reads_from::<u32, _>(input.as_bytes(), "inline").unwrap();

        assert_eq!(reads, vec![SeqRead::new(10, 5)]);
    }

    #[rstest]
    fn test_read_reads_missing_column(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "start,end\n1,3\n");
        let result = read_reads::<u32, _>(&path);

        assert_eq!(
            matches!(result, Err(ReadSetError::MissingColumn { ref column, .. }) if column == "length"),
            true
        );
    }

    #[rstest]
    fn test_read_reads_bad_integer_reports_line(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "start,length\n1,3\n2,x\n");
        let result = read_reads::<u32, _>(&path);

        assert_eq!(
            matches!(result, Err(ReadSetError::ParseError { line: 3, .. })),
            true
        );
    }

    #[rstest]
    fn test_read_reads_empty(tempdir: TempDir) {
        let path = write_file(&tempdir, "reads.csv", "start,length\n");
        let result = read_reads::<u32, _>(&path);
        assert_eq!(matches!(result, Err(ReadSetError::EmptyReadSet(_))), true);

        let path = write_file(&tempdir, "blank.csv", "");
        let result = read_reads::<u32, _>(&path);
        assert_eq!(matches!(result, Err(ReadSetError::EmptyReadSet(_))), true);
    }

    #[rstest]
    fn test_missing_file() {
        let result = read_loci::<u32, _>("does/not/exist.csv");
        assert_eq!(matches!(result, Err(ReadSetError::FileReadError(_))), true);
    }

    #[rstest]
    fn test_read_loci(tempdir: TempDir) {
        let path = write_file(&tempdir, "loci.csv", "position,coverage\n2,\n5,\n0,\n");
        let loci = read_loci::<u32, _>(&path).unwrap();

        assert_eq!(loci, vec![2, 5, 0]);
    }

    #[rstest]
    fn test_read_loci_from_reader() {
        let loci = read_loci_from::<u64, _>(&b"name,position\na,7\nb,5000000000\n"[..], "inline");
        assert_eq!(loci.unwrap(), vec![7, 5_000_000_000]);
    }

    #[rstest]
    fn test_read_loci_short_row_reports_line() {
        let result = read_loci_from::<u32, _>(&b"name,position\na,1\nb\n"[..], "inline");
        assert_eq!(
            matches!(result, Err(ReadSetError::ParseError { line: 3, .. })),
            true
        );
    }

    #[rstest]
    fn test_write_loci() {
        let loci = vec![
            Locus {
                position: 2u32,
                coverage: Some(2),
            },
            Locus {
                position: 4,
                coverage: Some(0),
            },
        ];
        let mut out = Vec::new();
        write_loci(&mut out, &loci).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "position,coverage\n2,2\n4,0\n");
    }

    #[rstest]
    fn test_write_then_read_loci(tempdir: TempDir) {
        let path = tempdir.path().join("out.csv");
        let loci = vec![Locus::new(3u32), Locus::new(1)];
        write_loci_to(path.to_str().unwrap(), &loci).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "position,coverage\n3,\n1,\n");
        assert_eq!(read_loci::<u32, _>(&path).unwrap(), vec![3, 1]);
    }
}
