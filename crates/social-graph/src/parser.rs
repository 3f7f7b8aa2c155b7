//! Parser for `::`-delimited dataset files.
//!
//! - users.dat: userId::login::name
//! - films.dat: filmId::name::releaseDate::genreIds::directorIds
//!   (date as YYYY-MM-DD, id lists pipe-separated and possibly empty)
//! - likes.dat: userId::filmId
//! - friends.dat: userId::friendId
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::error::{GraphError, Result};
use crate::types::*;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Fields of one line, with errors that point back at the file and line
struct Fields<'a> {
    file: &'static str,
    line: usize,
    parts: std::str::Split<'a, &'static str>,
}

impl<'a> Fields<'a> {
    fn new(file: &'static str, line: usize, text: &'a str) -> Self {
        Self {
            file,
            line,
            parts: text.split("::"),
        }
    }

    fn next_str(&mut self, name: &str) -> Result<&'a str> {
        self.parts.next().ok_or_else(|| GraphError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason: format!("Missing {}", name),
        })
    }

    fn next_parsed<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.next_str(name)?;
        raw.trim().parse().map_err(|e| GraphError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason: format!("Invalid {}: {}", name, e),
        })
    }
}

/// Numbered, non-empty, non-comment lines of a file
fn data_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let mut users = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let mut fields = Fields::new("users.dat", line_no, &line);
        users.push(User {
            id: fields.next_parsed("userId")?,
            login: fields.next_str("login")?.to_string(),
            name: fields.next_str("name")?.to_string(),
        });
    }
    Ok(users)
}

pub fn parse_films(path: &Path) -> Result<Vec<Film>> {
    let mut films = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let mut fields = Fields::new("films.dat", line_no, &line);
        let id = fields.next_parsed("filmId")?;
        let name = fields.next_str("name")?.to_string();
        let release_date = parse_date(fields.next_str("releaseDate")?)?;
        let genres = parse_id_list(fields.next_str("genres")?, "genre")?
            .into_iter()
            .map(parse_genre)
            .collect::<Result<Vec<_>>>()?;
        let directors = parse_id_list(fields.next_str("directors")?, "director")?;

        films.push(Film {
            id,
            name,
            release_date,
            genres,
            directors,
        });
    }
    Ok(films)
}

pub fn parse_likes(path: &Path) -> Result<Vec<LikeEdge>> {
    let mut likes = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let mut fields = Fields::new("likes.dat", line_no, &line);
        likes.push(LikeEdge {
            user_id: fields.next_parsed("userId")?,
            film_id: fields.next_parsed("filmId")?,
        });
    }
    Ok(likes)
}

pub fn parse_friends(path: &Path) -> Result<Vec<FriendEdge>> {
    let mut friends = Vec::new();
    for (line_no, line) in data_lines(path)? {
        let mut fields = Fields::new("friends.dat", line_no, &line);
        friends.push(FriendEdge {
            user_id: fields.next_parsed("userId")?,
            friend_id: fields.next_parsed("friendId")?,
        });
    }
    Ok(friends)
}

/// Example: "1985-10-20" -> 1985-10-20
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| GraphError::InvalidValue {
        field: "releaseDate".to_string(),
        value: s.to_string(),
    })
}

/// Example: "1|3" -> [1, 3], "" -> []
fn parse_id_list(s: &str, field: &str) -> Result<Vec<u32>> {
    s.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| GraphError::InvalidValue {
                field: field.to_string(),
                value: part.to_string(),
            })
        })
        .collect()
}

fn parse_genre(id: u32) -> Result<Genre> {
    Genre::from_id(id).ok_or_else(|| GraphError::InvalidValue {
        field: "genre".to_string(),
        value: id.to_string(),
    })
}
