//! Pre-publish validation over a notes directory.

use dato_notes::{ValidationError, validate_notes_dir};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, content)?;
    Ok(())
}

fn error(file: &str, message: &str) -> ValidationError {
    ValidationError {
        file: file.to_string(),
        message: message.to_string(),
    }
}

#[test]
fn test_clean_directory_passes() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(
        &tmp.path().join("alpha.md"),
        "---\ntitle: Alpha\ndate: 2024-05-01\ntags: [a, b]\ntype: essay\n---\n```rust\nfn main() {}\n```\n",
    )?;
    write_file(&tmp.path().join("beta.md"), "---\ntitle: Beta\n---\nPlain.\n")?;

    let report = validate_notes_dir(tmp.path())?;
    assert!(report.is_ok(), "{report}");
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.to_string(), "Validated 2 note(s): OK");
    Ok(())
}

#[test]
fn test_every_failure_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("a-bad-date.md"), "---\ntitle: Dated\ndate: 2024-02-30\n---\n")?;
    write_file(&tmp.path().join("b-no-title.md"), "---\ntags: [x]\n---\n")?;
    write_file(&tmp.path().join("c-plain.md"), "# No front matter\n")?;
    write_file(&tmp.path().join("d-tags.md"), "---\ntitle: Tags\ntags: solo\n---\n")?;
    write_file(&tmp.path().join("e-type.md"), "---\ntitle: Typed\ntype: Poem\n---\n")?;
    write_file(
        &tmp.path().join("f-fence.md"),
        "---\ntitle: Fence\n---\nintro\n```\nnever closed\n",
    )?;
    write_file(&tmp.path().join("g-slug.md"), "---\ntitle: Slug\nslug: Bad_Slug\n---\n")?;
    write_file(&tmp.path().join("h-dup.md"), "---\ntitle: Dated\n---\n")?;

    let report = validate_notes_dir(tmp.path())?;
    assert!(!report.is_ok());
    assert_eq!(report.files_checked, 8);
    assert_eq!(
        report.errors,
        vec![
            error("a-bad-date.md", "date '2024-02-30' must be valid YYYY-MM-DD"),
            error(
                "b-no-title.md",
                "required frontmatter field 'title' is missing or empty"
            ),
            error("c-plain.md", "missing frontmatter start delimiter (---)"),
            error("d-tags.md", "tags must be an array of strings"),
            error("e-type.md", "type 'poem' is invalid"),
            error("f-fence.md", "unclosed code fence starting at content line 2"),
            error("g-slug.md", "slug 'Bad_Slug' must be lowercase kebab-case"),
            error("h-dup.md", "duplicate slug 'dated' (already used in a-bad-date.md)"),
        ]
    );
    let text = report.to_string();
    assert!(text.starts_with("Note validation failed:\n- a-bad-date.md: "));
    Ok(())
}

#[test]
fn test_missing_directory_is_a_failure() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let missing = tmp.path().join("notes");
    let report = validate_notes_dir(&missing)?;
    assert!(!report.is_ok());
    assert_eq!(report.errors[0].message, "missing notes directory");
    Ok(())
}

#[test]
fn test_longer_fence_closes_shorter_opener() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(
        &tmp.path().join("fences.md"),
        "---\ntitle: Fences\n---\n~~~~\n```\nstill inside\n~~~~~\n",
    )?;
    let report = validate_notes_dir(tmp.path())?;
    assert!(report.is_ok(), "{report}");
    Ok(())
}
