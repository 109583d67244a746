use crate::note_index::models::Note;
use chrono::NaiveDate;
use std::cmp::Ordering;

fn cmp_optional_date_desc(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_title(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Date descending (undated last), then title, then slug.
pub(super) fn compare_notes(left: &Note, right: &Note) -> Ordering {
    cmp_optional_date_desc(left.date, right.date)
        .then_with(|| cmp_title(&left.title, &right.title))
        .then_with(|| left.slug.cmp(&right.slug))
}

pub(super) fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(compare_notes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note_index::classify::NoteKind;

    fn note(slug: &str, title: &str, date: Option<&str>) -> Note {
        Note {
            slug: slug.to_string(),
            title: title.to_string(),
            date: date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            tags: Vec::new(),
            kind: NoteKind::Note,
            has_page: false,
            content: String::new(),
            excerpt: String::new(),
            reading_time: "1 min read".to_string(),
            links: Vec::new(),
            backlinks: Vec::new(),
        }
    }

    #[test]
    fn test_date_desc_undated_last_then_title() {
        let mut notes = vec![
            note("undated", "Undated", None),
            note("beta", "Beta", Some("2024-05-01")),
            note("newest", "Newest", Some("2024-06-01")),
            note("alpha", "Alpha", Some("2024-05-01")),
        ];
        sort_notes(&mut notes);
        let slugs: Vec<&str> = notes.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newest", "alpha", "beta", "undated"]);
    }

    #[test]
    fn test_slug_breaks_full_ties() {
        let mut notes = vec![note("b", "Same", None), note("a", "Same", None)];
        sort_notes(&mut notes);
        assert_eq!(notes[0].slug, "a");
    }

    #[test]
    fn test_title_comparison_ignores_case_first() {
        let mut notes = vec![note("z", "zebra", None), note("y", "Apple", None)];
        sort_notes(&mut notes);
        assert_eq!(notes[0].slug, "y");
    }
}
