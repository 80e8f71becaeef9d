use catalog_dal::genre::CreateGenre;
use garde::Validate;
use serde::Deserialize;

pub const NAME_TOO_SHORT: &str = "Genre name must contain at least 3 characters";
pub const NAME_TOO_LONG: &str = "Genre name must not exceed 100 characters";

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 100;

/// Raw genre form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenreForm {
    #[serde(default)]
    #[garde(custom(genre_name_length))]
    pub name: String,
}

/// Form that failed validation.
///
/// Still carries the sanitized candidate, so it can be echoed back to the user.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub genre: CreateGenre,
    pub errors: Vec<String>,
}

impl GenreForm {
    /// Trims the name, checks every rule and escapes markup.
    ///
    /// Length is checked on the trimmed text before escaping. All failed rules
    /// are reported, not only the first one.
    pub fn sanitize(self) -> Result<CreateGenre, Rejected> {
        let trimmed = GenreForm {
            name: self.name.trim().to_string(),
        };
        let errors = match trimmed.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|(_path, error)| error.message().to_string())
                .collect(),
        };
        let genre = CreateGenre {
            name: escape(&trimmed.name),
        };

        if errors.is_empty() {
            Ok(genre)
        } else {
            Err(Rejected { genre, errors })
        }
    }
}

fn genre_name_length(value: &str, _context: &()) -> garde::Result {
    let chars = value.chars().count();
    if chars < NAME_MIN_CHARS {
        Err(garde::Error::new(NAME_TOO_SHORT))
    } else if chars > NAME_MAX_CHARS {
        Err(garde::Error::new(NAME_TOO_LONG))
    } else {
        Ok(())
    }
}

/// Replaces `& < > " ' /` with HTML entities.
pub fn escape(input: &str) -> String {
    tera::escape_html(input)
}
