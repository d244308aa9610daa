use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DataError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A movie row with a usable rating
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    pub average: f64,
    pub country: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub votes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MovieTable {
    /// Every data row in the file, rated or not.
    pub total_rows: usize,
    pub movies: Vec<Movie>,
}

/// Column positions resolved from the header row
struct Columns {
    title: usize,
    average: usize,
    country: Option<usize>,
    genre: Option<usize>,
    release_date: Option<usize>,
    votes: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        Ok(Self {
            title: find("title").ok_or(DataError::MissingColumn("title"))?,
            average: find("average").ok_or(DataError::MissingColumn("average"))?,
            country: find("country"),
            genre: find("genre"),
            release_date: find("release_date"),
            votes: find("votes"),
        })
    }
}

/// Load movies from a CSV file on disk.
pub fn load_movies(path: &Path) -> Result<MovieTable, DataError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
        _ => DataError::Io(e),
    })?;

    let table = read_movies(file)?;
    info!(
        "Read {} records from {} ({} with a valid rating)",
        table.total_rows,
        path.display(),
        table.movies.len()
    );
    Ok(table)
}

/// Parse movie CSV data. Rows whose `average` is empty or not a finite number are dropped.
pub fn read_movies<R: Read>(reader: R) -> Result<MovieTable, DataError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::resolve(reader.headers()?)?;
    let mut table = MovieTable::default();

    for record in reader.records() {
        let record = record?;
        table.total_rows += 1;

        let Some(average) = record.get(columns.average).and_then(parse_rating) else {
            debug!("Skipping row {} without a numeric rating", table.total_rows);
            continue;
        };

        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        table.movies.push(Movie {
            title: record.get(columns.title).unwrap_or_default().to_string(),
            average,
            country: field(columns.country),
            genre: field(columns.genre),
            release_date: field(columns.release_date),
            votes: field(columns.votes),
        });
    }

    Ok(table)
}

fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The `n` highest-rated movies, best first. Equal ratings keep file order.
pub fn top_rated(movies: &[Movie], n: usize) -> Vec<Movie> {
    let mut ranked = movies.to_vec();
    ranked.sort_by(|a, b| b.average.total_cmp(&a.average));
    ranked.truncate(n);
    ranked
}

/// Plain-text table of title, rating, country and release date.
pub fn render_table(movies: &[Movie]) -> String {
    const HEADERS: [&str; 4] = ["title", "average", "country", "release_date"];
    let dash = || "-".to_string();

    let rows: Vec<[String; 4]> = movies
        .iter()
        .map(|m| {
            [
                m.title.clone(),
                format!("{:?}", m.average),
                m.country.clone().unwrap_or_else(dash),
                m.release_date.clone().unwrap_or_else(dash),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(HEADERS)];
    for [title, average, country, release_date] in &rows {
        lines.push(format_row([
            title.as_str(),
            average.as_str(),
            country.as_str(),
            release_date.as_str(),
        ]));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
title,average,votes,genre,release_date,country
肖申克的救赎,9.7,2000000,剧情,1994-09-10,美国
霸王别姬,9.6,1500000,剧情,1993-01-01,中国大陆
无评分电影,,10,喜剧,,中国香港
坏数据,N/A,5,剧情,2001-01-01,
阿甘正传,9.5,1800000,剧情,1994-06-23,美国
泰坦尼克号,9.5,1700000,爱情,1997-11-01,美国
";

    #[test]
    fn test_read_drops_unrated_rows() {
        let table = read_movies(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.total_rows, 6);
        assert_eq!(table.movies.len(), 4);
        assert!(table.movies.iter().all(|m| m.title != "无评分电影"));
        assert!(table.movies.iter().all(|m| m.title != "坏数据"));
    }

    #[test]
    fn test_optional_columns() {
        let table = read_movies("title,average\nA,8.1\n".as_bytes()).unwrap();
        let movie = &table.movies[0];
        assert_eq!(movie.average, 8.1);
        assert!(movie.country.is_none());
        assert!(movie.votes.is_none());
    }

    #[test]
    fn test_missing_rating_column() {
        let err = read_movies("title,score\nA,8.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn("average")));
    }

    #[test]
    fn test_top_rated_is_descending_and_stable() {
        let table = read_movies(SAMPLE.as_bytes()).unwrap();
        let top = top_rated(&table.movies, 3);
        let titles: Vec<&str> = top.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["肖申克的救赎", "霸王别姬", "阿甘正传"]);
    }

    #[test]
    fn test_top_rated_shorter_than_n() {
        let table = read_movies(SAMPLE.as_bytes()).unwrap();
        assert_eq!(top_rated(&table.movies, 10).len(), 4);
        assert!(top_rated(&[], 10).is_empty());
    }

    #[test]
    fn test_render_table() {
        let table = read_movies("title,average\nLong Movie Title,9.1\nB,8\n".as_bytes()).unwrap();
        let rendered = render_table(&table.movies);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("title             average"));
        assert!(lines[1].starts_with("Long Movie Title  9.1"));
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn test_render_table_whole_rating_as_float() {
        let table = read_movies("title,average\nA,9\n".as_bytes()).unwrap();
        let rendered = render_table(&table.movies);
        let row = rendered.lines().nth(1).unwrap();
        assert!(row.starts_with("A      9.0  "), "row was {:?}", row);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_movies(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_load_from_disk_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}title,average\nA,7.5\n").unwrap();
        let table = load_movies(file.path()).unwrap();
        assert_eq!(table.movies[0].title, "A");
    }
}
