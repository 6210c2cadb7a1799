//! Normalization of raw catalog records into [`UnifiedBook`].
//!
//! Every function here is pure and total: missing or malformed fields fall
//! back to the defaults below and never produce an error.
//!
//! | Field  | Google Books                | Gutendex              | Open Library        |
//! |--------|-----------------------------|-----------------------|---------------------|
//! | id     | `id`                        | `id`                  | `key`               |
//! | title  | `volumeInfo.title`          | `title`               | `title`             |
//! | author | `volumeInfo.authors[0]`     | `authors[0].name`     | `author_name[0]`    |
//! | cover  | `imageLinks.thumbnail`      | `formats[image/jpeg]` | templated `cover_i` |
//!
//! A record without an identifier is dropped, since it could never be opened.

use super::{
    GoogleVolume, GutendexBook, OpenLibraryDoc, RawPage, RawRecord, UnifiedBook, UNKNOWN_AUTHOR,
    UNTITLED,
};
use url::Url;

/// Cover template base for Open Library `cover_i` values.
pub const OPEN_LIBRARY_COVER_BASE: &str = "https://covers.openlibrary.org/b/id";

const GUTENBERG_COVER_FORMAT: &str = "image/jpeg";

/// Normalize every record of one raw page.
pub fn normalize(page: &RawPage) -> Vec<UnifiedBook> {
    match page {
        RawPage::GoogleBooks { items, .. } => items.iter().filter_map(normalize_google).collect(),
        RawPage::Gutenberg { results, .. } => {
            results.iter().filter_map(normalize_gutenberg).collect()
        }
        RawPage::OpenLibrary { docs, .. } => {
            docs.iter().filter_map(normalize_open_library).collect()
        }
    }
}

/// Normalize a single raw record.
pub fn normalize_record(record: &RawRecord) -> Option<UnifiedBook> {
    match record {
        RawRecord::GoogleBooks(volume) => normalize_google(volume),
        RawRecord::Gutenberg(book) => normalize_gutenberg(book),
        RawRecord::OpenLibrary(doc) => normalize_open_library(doc),
    }
}

fn normalize_google(volume: &GoogleVolume) -> Option<UnifiedBook> {
    let id = non_blank(volume.id.as_deref())?;
    let info = volume.volume_info.as_ref();

    let title = info
        .and_then(|i| non_blank(i.title.as_deref()))
        .unwrap_or(UNTITLED);
    let author = info.and_then(|i| first_name(i.authors.as_deref()));
    let cover = info
        .and_then(|i| i.image_links.as_ref())
        .and_then(|links| {
            non_blank(links.thumbnail.as_deref()).or(non_blank(links.small_thumbnail.as_deref()))
        })
        .and_then(secure_url);

    Some(finish(
        UnifiedBook::new(id, title, RawRecord::GoogleBooks(volume.clone())),
        author,
        cover,
    ))
}

fn normalize_gutenberg(book: &GutendexBook) -> Option<UnifiedBook> {
    let id = book.id?.to_string();

    let title = non_blank(book.title.as_deref()).unwrap_or(UNTITLED);
    let author = book
        .authors
        .first()
        .and_then(|person| non_blank(person.name.as_deref()));
    let cover = book
        .formats
        .get(GUTENBERG_COVER_FORMAT)
        .and_then(|url| secure_url(url));

    Some(finish(
        UnifiedBook::new(id, title, RawRecord::Gutenberg(book.clone())),
        author,
        cover,
    ))
}

fn normalize_open_library(doc: &OpenLibraryDoc) -> Option<UnifiedBook> {
    let key = non_blank(doc.key.as_deref())?;

    let title = non_blank(doc.title.as_deref()).unwrap_or(UNTITLED);
    let author = first_name(doc.author_name.as_deref());
    let cover = doc.cover_i.and_then(open_library_cover_url);

    Some(finish(
        UnifiedBook::new(key, title, RawRecord::OpenLibrary(doc.clone())),
        author,
        cover,
    ))
}

fn finish(book: UnifiedBook, author: Option<&str>, cover: Option<String>) -> UnifiedBook {
    let book = book.with_author(author.unwrap_or(UNKNOWN_AUTHOR));
    match cover {
        Some(url) => book.with_cover(url),
        None => book,
    }
}

/// Cover URL for an Open Library cover id. Non-positive ids mean "no cover".
pub fn open_library_cover_url(cover_i: i64) -> Option<String> {
    (cover_i > 0).then(|| format!("{}/{}-M.jpg", OPEN_LIBRARY_COVER_BASE, cover_i))
}

/// Force an image URL onto `https`.
///
/// Protocol-relative URLs are accepted. Anything that is not http(s) yields
/// `None`, which keeps the book off composed pages.
pub fn secure_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };

    let mut url = Url::parse(&candidate).ok()?;
    match url.scheme() {
        "https" => {}
        "http" => url.set_scheme("https").ok()?,
        _ => return None,
    }
    url.host_str()?;
    Some(url.to_string())
}

fn first_name(names: Option<&[String]>) -> Option<&str> {
    names
        .and_then(|names| names.first())
        .and_then(|name| non_blank(Some(name.as_str())))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federated::{GutendexPerson, ImageLinks, Source, VolumeInfo};
    use std::collections::BTreeMap;

    fn google(id: &str, authors: Option<Vec<&str>>, thumbnail: Option<&str>) -> GoogleVolume {
        GoogleVolume {
            id: Some(id.to_string()),
            volume_info: Some(VolumeInfo {
                title: Some("Dune".to_string()),
                authors: authors.map(|a| a.into_iter().map(String::from).collect()),
                image_links: thumbnail.map(|t| ImageLinks {
                    thumbnail: Some(t.to_string()),
                    small_thumbnail: None,
                }),
                published_date: None,
            }),
        }
    }

    #[test]
    fn test_google_cover_forced_to_https() {
        let volume = google(
            "abc123",
            Some(vec!["Frank Herbert", "Someone Else"]),
            Some("http://books.google.com/books/content?id=abc123&img=1"),
        );
        let page = RawPage::GoogleBooks {
            items: vec![volume.clone()],
            total_items: Some(1),
        };

        let books = normalize(&page);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].source, Source::GoogleBooks);
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(
            books[0].cover_url.as_deref(),
            Some("https://books.google.com/books/content?id=abc123&img=1")
        );
        assert_eq!(books[0].raw, RawRecord::GoogleBooks(volume));
    }

    #[test]
    fn test_google_missing_fields_use_defaults() {
        let volume = GoogleVolume {
            id: Some("x".into()),
            volume_info: None,
        };
        let book = normalize_record(&RawRecord::GoogleBooks(volume)).unwrap();
        assert_eq!(book.title, UNTITLED);
        assert_eq!(book.author, UNKNOWN_AUTHOR);
        assert!(book.cover_url.is_none());

        let no_authors =
            normalize_record(&RawRecord::GoogleBooks(google("y", None, None))).unwrap();
        assert_eq!(no_authors.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_google_without_id_is_dropped() {
        let page = RawPage::GoogleBooks {
            items: vec![GoogleVolume::default(), google("keep", None, None)],
            total_items: None,
        };
        let books = normalize(&page);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, "keep");
    }

    #[test]
    fn test_gutenberg_record() {
        let mut formats = BTreeMap::new();
        formats.insert(
            "image/jpeg".to_string(),
            "https://www.gutenberg.org/cache/epub/84/pg84.cover.medium.jpg".to_string(),
        );
        let book = GutendexBook {
            id: Some(84),
            title: Some("Frankenstein".into()),
            authors: vec![GutendexPerson {
                name: Some("Shelley, Mary Wollstonecraft".into()),
                ..Default::default()
            }],
            formats,
            ..Default::default()
        };

        let unified = normalize_record(&RawRecord::Gutenberg(book)).unwrap();
        assert_eq!(unified.id, "84");
        assert_eq!(unified.author, "Shelley, Mary Wollstonecraft");
        assert!(unified.cover_url.unwrap().starts_with("https://www.gutenberg.org/"));
    }

    #[test]
    fn test_gutenberg_empty_authors() {
        let book = GutendexBook {
            id: Some(1),
            ..Default::default()
        };
        let unified = normalize_record(&RawRecord::Gutenberg(book)).unwrap();
        assert_eq!(unified.author, UNKNOWN_AUTHOR);
        assert_eq!(unified.title, UNTITLED);
        assert!(unified.cover_url.is_none());
    }

    #[test]
    fn test_open_library_cover_template() {
        let doc = OpenLibraryDoc {
            key: Some("/works/OL45804W".into()),
            title: Some("Fantastic Mr Fox".into()),
            author_name: Some(vec!["Roald Dahl".into()]),
            cover_i: Some(6498519),
            first_publish_year: Some(1970),
        };
        let book = normalize_record(&RawRecord::OpenLibrary(doc)).unwrap();
        assert_eq!(book.id, "/works/OL45804W");
        assert_eq!(
            book.cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/6498519-M.jpg")
        );

        assert_eq!(open_library_cover_url(-1), None);
        assert_eq!(open_library_cover_url(0), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let page = RawPage::OpenLibrary {
            docs: vec![
                OpenLibraryDoc {
                    key: Some("/works/OL1W".into()),
                    cover_i: Some(1),
                    ..Default::default()
                },
                OpenLibraryDoc::default(),
            ],
            num_found: Some(2),
        };
        assert_eq!(normalize(&page), normalize(&page));
    }

    #[test]
    fn test_secure_url() {
        assert_eq!(
            secure_url("http://example.com/a.jpg").as_deref(),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(
            secure_url("//example.com/a.jpg").as_deref(),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(secure_url("ftp://example.com/a.jpg"), None);
        assert_eq!(secure_url("not a url"), None);
    }
}
