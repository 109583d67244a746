//! Note authoring: normalization, template output and write-once files.

use chrono::NaiveDate;
use dato_notes::{
    AuthoringError, Frontmatter, IndexOptions, NewNoteRequest, NoteIndex, NoteKind, NoteStore,
    split_frontmatter, write_note,
};
use tempfile::TempDir;

fn today() -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(2024, 7, 9).ok_or_else(|| "invalid date".into())
}

#[test]
fn test_written_note_is_indexed() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let notes_dir = tmp.path().join("notes");
    let request = NewNoteRequest {
        title: "  Café: \"Quoted\" Thoughts ".to_string(),
        body: "First line.\nSecond line.".to_string(),
        tags: vec!["coffee, writing".to_string(), " ".to_string()],
        note_type: Some("essay".to_string()),
        status: Some("seed".to_string()),
        excerpt_placeholder: true,
        ..NewNoteRequest::default()
    };
    let note = request.normalize(today()?)?;
    assert_eq!(note.slug, "cafe-quoted-thoughts");
    assert_eq!(note.tags, vec!["coffee", "writing"]);

    let path = write_note(&notes_dir, &note)?;
    assert_eq!(path, notes_dir.join("cafe-quoted-thoughts.md"));
    let written = std::fs::read_to_string(&path)?;
    assert!(written.starts_with("---\ntitle: "));
    assert!(written.ends_with("---\n\nFirst line.\nSecond line.\n"));
    let (mapping, _) = split_frontmatter(&written)?;
    let fm = Frontmatter::from_mapping(&mapping);
    assert_eq!(fm.title.as_deref(), Some("Café: \"Quoted\" Thoughts"));
    assert_eq!(fm.date, Some(today()?));
    assert_eq!(mapping.get("excerpt").and_then(|v| v.as_str()), Some(""));

    let store = NoteStore::new(&notes_dir, IndexOptions::default());
    let indexed = store
        .note_by_slug("cafe-quoted-thoughts")?
        .ok_or("written note not indexed")?;
    assert_eq!(indexed.title, "Café: \"Quoted\" Thoughts");
    assert_eq!(indexed.tags, vec!["coffee", "writing"]);
    assert_eq!(indexed.kind, NoteKind::Essay);
    assert_eq!(indexed.date, Some(today()?));
    assert_eq!(indexed.excerpt, "First line. Second line.");
    Ok(())
}

#[test]
fn test_control_characters_in_title_stay_indexable() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let note = NewNoteRequest {
        title: "Bell\u{7} note".to_string(),
        tags: vec!["a\u{1b}b".to_string()],
        ..NewNoteRequest::default()
    }
    .normalize(today()?)?;
    assert_eq!(note.slug, "bell-note");
    write_note(tmp.path(), &note)?;

    let index = NoteIndex::build(tmp.path(), &IndexOptions::default())?;
    assert!(index.issues().is_empty(), "{:?}", index.issues());
    assert_eq!(index.len(), 1);
    let indexed = index.note("bell-note").ok_or("written note not indexed")?;
    assert_eq!(indexed.title, "Bell\u{7} note");
    assert_eq!(indexed.tags, vec!["a\u{1b}b"]);
    Ok(())
}

#[test]
fn test_existing_slug_is_not_overwritten() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let request = NewNoteRequest {
        title: "Same".to_string(),
        body: "original".to_string(),
        ..NewNoteRequest::default()
    };
    let note = request.normalize(today()?)?;
    let path = write_note(tmp.path(), &note)?;

    let again = NewNoteRequest {
        title: "Other title".to_string(),
        slug: Some("same".to_string()),
        body: "replacement".to_string(),
        ..NewNoteRequest::default()
    }
    .normalize(today()?)?;
    let err = write_note(tmp.path(), &again).err().ok_or("expected conflict")?;
    assert!(matches!(err, AuthoringError::AlreadyExists(_)));
    assert!(std::fs::read_to_string(path)?.contains("original"));
    Ok(())
}

#[test]
fn test_invalid_requests() -> Result<(), Box<dyn std::error::Error>> {
    let blank = NewNoteRequest {
        title: "   ".to_string(),
        ..NewNoteRequest::default()
    };
    assert!(matches!(
        blank.normalize(today()?),
        Err(AuthoringError::MissingTitle)
    ));

    let symbols = NewNoteRequest {
        title: "!!!".to_string(),
        ..NewNoteRequest::default()
    };
    assert!(matches!(
        symbols.normalize(today()?),
        Err(AuthoringError::EmptySlug)
    ));

    let bad_date = NewNoteRequest {
        title: "Dated".to_string(),
        date: Some("2024-13-01".to_string()),
        ..NewNoteRequest::default()
    };
    assert!(matches!(
        bad_date.normalize(today()?),
        Err(AuthoringError::InvalidDate(raw)) if raw == "2024-13-01"
    ));

    let rfc = NewNoteRequest {
        title: "Dated".to_string(),
        date: Some("2024-03-05T10:00:00Z".to_string()),
        ..NewNoteRequest::default()
    }
    .normalize(today()?)?;
    assert_eq!(rfc.date, NaiveDate::from_ymd_opt(2024, 3, 5).ok_or("date")?);
    Ok(())
}
