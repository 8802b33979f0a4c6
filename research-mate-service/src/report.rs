//! Rendering of an [`AnalysisRecord`] to the on-screen view (HTML) and to the
//! downloadable Markdown report.
//!
//! Both outputs read every field through [`ReportFields`], so they always show
//! the same text and the same fallbacks. Rendering is pure: the same record
//! always yields the same bytes.

use crate::models::AnalysisRecord;
use html_escape::encode_text;

pub const MISSING_VALUE: &str = "N/A";
pub const MISSING_SECTION: &str = "Not provided.";
pub const UNTITLED: &str = "Untitled Paper";
pub const DEFAULT_FILE_BASE: &str = "summary";
pub const FILE_SUFFIX: &str = "_Analysis";
pub const FILE_EXTENSION: &str = ".md";
/// Registered Markdown media type (RFC 7763).
pub const REPORT_MEDIA_TYPE: &str = "text/markdown; charset=utf-8";
pub const FOOTER: &str = "*Analysis generated by ResearchMate (Powered by Gemini)*";

/// The six prose sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Abstract,
    Introduction,
    Objective,
    Methodology,
    Results,
    Discussion,
}

impl Section {
    pub const ORDER: [Section; 6] = [
        Self::Abstract,
        Self::Introduction,
        Self::Objective,
        Self::Methodology,
        Self::Results,
        Self::Discussion,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Self::Abstract => "📖 Abstract",
            Self::Introduction => "🔦 Introduction",
            Self::Objective => "🎯 Objective & Hypotheses",
            Self::Methodology => "🧪 Methodology",
            Self::Results => "📊 Results",
            Self::Discussion => "💬 Discussion",
        }
    }

    fn source<'a>(&self, record: &'a AnalysisRecord) -> Option<&'a String> {
        match self {
            Self::Abstract => record.abstract_summary.as_ref(),
            Self::Introduction => record.introduction_summary.as_ref(),
            Self::Objective => record.objective_hypotheses.as_ref(),
            Self::Methodology => record.methodology_summary.as_ref(),
            Self::Results => record.results_summary.as_ref(),
            Self::Discussion => record.discussion_summary.as_ref(),
        }
    }
}

/// Display text of every record field with fallbacks applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFields<'a> {
    pub title: &'a str,
    pub authors: String,
    pub journal: &'a str,
    pub year: &'a str,
    pub subject: &'a str,
    pub keywords: Vec<&'a str>,
    pub keywords_line: String,
    pub sections: Vec<(Section, &'a str)>,
    pub conclusions: Vec<&'a str>,
}

impl<'a> ReportFields<'a> {
    pub fn from_record(record: &'a AnalysisRecord) -> Self {
        let keywords = non_blank_items(record.keywords.as_ref());

        Self {
            title: scalar(record.title.as_ref()).unwrap_or(UNTITLED),
            authors: joined(&non_blank_items(record.authors.as_ref())),
            journal: scalar(record.journal.as_ref()).unwrap_or(MISSING_VALUE),
            year: scalar(record.publication_year.as_ref()).unwrap_or(MISSING_VALUE),
            subject: scalar(record.main_subject.as_ref()).unwrap_or(MISSING_VALUE),
            keywords_line: joined(&keywords),
            keywords,
            sections: Section::ORDER
                .iter()
                .map(|section| {
                    (
                        *section,
                        scalar(section.source(record)).unwrap_or(MISSING_SECTION),
                    )
                })
                .collect(),
            conclusions: non_blank_items(record.main_conclusions.as_ref()),
        }
    }
}

fn scalar(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn non_blank_items(items: Option<&Vec<String>>) -> Vec<&str> {
    items
        .map(|items| {
            items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn joined(items: &[&str]) -> String {
    if items.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        items.join(", ")
    }
}

/// HTML fragment: overview card, two section columns, conclusions card.
pub fn render_screen_view(record: &AnalysisRecord) -> String {
    let fields = ReportFields::from_record(record);
    let mut html = String::new();

    let tags = if fields.keywords.is_empty() {
        format!(r#"<span class="tag tag-empty">{}</span>"#, MISSING_VALUE)
    } else {
        fields
            .keywords
            .iter()
            .map(|k| format!(r#"<span class="tag">{}</span>"#, encode_text(k)))
            .collect()
    };

    html.push_str(&format!(
        r#"<div class="summary-card overview">
  <h3>📄 {title}</h3>
  <p><strong>👥 Authors:</strong> {authors}</p>
  <p><strong>🗓️ Publication:</strong> {journal} ({year})</p>
  <p><strong>🔖 Subject:</strong> {subject}</p>
  <div class="tags">{tags}</div>
</div>
"#,
        title = encode_text(fields.title),
        authors = encode_text(&fields.authors),
        journal = encode_text(fields.journal),
        year = encode_text(fields.year),
        subject = encode_text(fields.subject),
        tags = tags,
    ));

    // Sections alternate left/right by position
    let mut columns = [String::new(), String::new()];
    for (index, (section, body)) in fields.sections.iter().enumerate() {
        columns[index % 2].push_str(&format!(
            r#"    <div class="summary-card"><h3>{}</h3><p>{}</p></div>
"#,
            encode_text(section.heading()),
            encode_text(body)
        ));
    }
    html.push_str(&format!(
        r#"<div class="columns">
  <div class="column column-left">
{}  </div>
  <div class="column column-right">
{}  </div>
</div>
"#,
        columns[0], columns[1]
    ));

    let items: String = fields
        .conclusions
        .iter()
        .map(|c| format!("<li>{}</li>", encode_text(c)))
        .collect();
    html.push_str(&format!(
        r#"<div class="summary-card"><h3>💡 Main Conclusions</h3><ul>{}</ul></div>
"#,
        items
    ));

    html
}

/// Full Markdown report offered for download.
pub fn render_markdown_report(record: &AnalysisRecord) -> String {
    let fields = ReportFields::from_record(record);
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", fields.title));
    md.push_str(&format!("*Authors:* {}\n", fields.authors));
    md.push_str(&format!("*Journal:* {} ({})\n", fields.journal, fields.year));
    md.push_str(&format!("*Main Subject:* {}\n", fields.subject));
    md.push_str(&format!("*Keywords:* {}\n\n", fields.keywords_line));
    md.push_str("---\n\n");

    for (section, body) in &fields.sections {
        md.push_str(&format!("## {}\n{}\n\n", section.heading(), body));
    }

    md.push_str("## 💡 Main Conclusions\n");
    for conclusion in &fields.conclusions {
        md.push_str(&format!("- {}\n", conclusion));
    }
    md.push_str("\n---\n");
    md.push_str(FOOTER);
    md.push('\n');

    md
}

/// `<title with spaces as underscores>_Analysis.md`, or `summary_Analysis.md`
/// when the title is absent or blank. The title is not trimmed, so leading and
/// trailing spaces become underscores too.
pub fn report_filename(record: &AnalysisRecord) -> String {
    let base = record
        .title
        .as_deref()
        .filter(|title| !title.trim().is_empty())
        .map(|title| title.replace(' ', "_"))
        .unwrap_or_else(|| DEFAULT_FILE_BASE.to_string());
    format!("{}{}{}", base, FILE_SUFFIX, FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo_bar() -> AnalysisRecord {
        AnalysisRecord {
            title: Some("Foo Bar".to_string()),
            authors: Some(vec!["A".to_string(), "B".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_both_outputs_share_field_text() {
        let record = foo_bar();
        let screen = render_screen_view(&record);
        let document = render_markdown_report(&record);

        for text in ["Foo Bar", "A, B", MISSING_SECTION, MISSING_VALUE] {
            assert!(screen.contains(text), "screen view missing {text}");
            assert!(document.contains(text), "document missing {text}");
        }

        // No conclusions: an empty list, not an error or placeholder item
        assert!(screen.contains("<ul></ul>"));
        assert!(document.contains("## 💡 Main Conclusions\n\n---"));
    }

    #[test]
    fn test_all_fields_absent_render_fallbacks() {
        let record = AnalysisRecord::default();
        let fields = ReportFields::from_record(&record);

        assert_eq!(fields.title, UNTITLED);
        assert_eq!(fields.authors, MISSING_VALUE);
        assert_eq!(fields.journal, MISSING_VALUE);
        assert_eq!(fields.year, MISSING_VALUE);
        assert_eq!(fields.subject, MISSING_VALUE);
        assert_eq!(fields.keywords_line, MISSING_VALUE);
        assert!(fields.sections.iter().all(|(_, body)| *body == MISSING_SECTION));
        assert!(fields.conclusions.is_empty());

        let screen = render_screen_view(&record);
        let document = render_markdown_report(&record);
        assert_eq!(screen.matches(MISSING_SECTION).count(), 6);
        assert_eq!(document.matches(MISSING_SECTION).count(), 6);
        assert!(document.starts_with("# Untitled Paper\n"));
        assert!(document.contains("*Journal:* N/A (N/A)"));
        assert_eq!(report_filename(&record), "summary_Analysis.md");
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let record = AnalysisRecord {
            title: Some("   ".to_string()),
            journal: Some(String::new()),
            authors: Some(vec![" ".to_string()]),
            results_summary: Some("\n".to_string()),
            ..Default::default()
        };
        let fields = ReportFields::from_record(&record);
        assert_eq!(fields.title, UNTITLED);
        assert_eq!(fields.journal, MISSING_VALUE);
        assert_eq!(fields.authors, MISSING_VALUE);
        assert_eq!(fields.sections[4], (Section::Results, MISSING_SECTION));
        assert_eq!(report_filename(&record), "summary_Analysis.md");
    }

    #[test]
    fn test_filename_from_title() {
        let record = AnalysisRecord {
            title: Some("My Paper: A Study".to_string()),
            ..Default::default()
        };
        assert_eq!(report_filename(&record), "My_Paper:_A_Study_Analysis.md");
        assert_eq!(report_filename(&record), report_filename(&record.clone()));

        let padded = AnalysisRecord {
            title: Some(" Foo ".to_string()),
            ..Default::default()
        };
        assert_eq!(report_filename(&padded), "_Foo__Analysis.md");
    }

    #[test]
    fn test_populated_record_has_identical_text_in_both_outputs() {
        let record = AnalysisRecord {
            title: Some("Foo Bar".to_string()),
            authors: Some(vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()]),
            publication_year: Some("2020".to_string()),
            journal: Some("Journal of Tests".to_string()),
            keywords: Some(vec!["graphs".to_string(), "proofs".to_string(), "rust".to_string()]),
            main_subject: Some("A subject sentence.".to_string()),
            abstract_summary: Some("Abstract body.".to_string()),
            introduction_summary: Some("Intro body.".to_string()),
            objective_hypotheses: Some("Objective body.".to_string()),
            methodology_summary: Some("Methods body.".to_string()),
            results_summary: Some("Results body.".to_string()),
            discussion_summary: Some("Discussion body.".to_string()),
            main_conclusions: Some(vec!["First finding".to_string(), "Second finding".to_string()]),
        };
        let screen = render_screen_view(&record);
        let document = render_markdown_report(&record);

        let mut expected = vec![
            "Foo Bar",
            "Ada Lovelace, Alan Turing",
            "2020",
            "Journal of Tests",
            "graphs",
            "proofs",
            "rust",
            "A subject sentence.",
            "Abstract body.",
            "Intro body.",
            "Objective body.",
            "Methods body.",
            "Results body.",
            "Discussion body.",
            "First finding",
            "Second finding",
        ];
        expected.extend(Section::ORDER.iter().map(|section| section.heading()));

        for text in expected {
            assert!(
                screen.contains(&*encode_text(text)),
                "screen view missing {text}"
            );
            assert!(document.contains(text), "document missing {text}");
        }
        assert!(!screen.contains(MISSING_VALUE));
        assert!(!document.contains(MISSING_VALUE));
        assert!(!screen.contains(MISSING_SECTION));
        assert!(!document.contains(MISSING_SECTION));
    }

    #[test]
    fn test_sections_alternate_columns_in_fixed_order() {
        let record = AnalysisRecord {
            abstract_summary: Some("S-abstract".to_string()),
            introduction_summary: Some("S-intro".to_string()),
            objective_hypotheses: Some("S-objective".to_string()),
            methodology_summary: Some("S-methods".to_string()),
            results_summary: Some("S-results".to_string()),
            discussion_summary: Some("S-discussion".to_string()),
            ..Default::default()
        };
        let screen = render_screen_view(&record);
        let right_start = screen.find("column-right").unwrap();
        let (left, right) = screen.split_at(right_start);

        for body in ["S-abstract", "S-objective", "S-results"] {
            assert!(left.contains(body), "{body} should be in the left column");
        }
        for body in ["S-intro", "S-methods", "S-discussion"] {
            assert!(right.contains(body), "{body} should be in the right column");
        }

        let document = render_markdown_report(&record);
        let positions: Vec<usize> = [
            "S-abstract",
            "S-intro",
            "S-objective",
            "S-methods",
            "S-results",
            "S-discussion",
        ]
        .iter()
        .map(|body| document.find(body).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_document_layout() {
        let record = AnalysisRecord {
            title: Some("Foo Bar".to_string()),
            authors: Some(vec!["A".to_string(), "B".to_string()]),
            publication_year: Some("2020".to_string()),
            journal: Some("Nature".to_string()),
            keywords: Some(vec!["x".to_string(), "y".to_string()]),
            main_subject: Some("Subject.".to_string()),
            main_conclusions: Some(vec!["One".to_string(), "Two".to_string()]),
            ..Default::default()
        };
        let document = render_markdown_report(&record);

        assert!(document.starts_with("# Foo Bar\n\n*Authors:* A, B\n"));
        assert!(document.contains("*Journal:* Nature (2020)\n"));
        assert!(document.contains("*Main Subject:* Subject.\n"));
        assert!(document.contains("*Keywords:* x, y\n"));
        assert!(document.contains("## 💡 Main Conclusions\n- One\n- Two\n"));
        assert!(document.trim_end().ends_with(FOOTER));
    }

    #[test]
    fn test_screen_view_escapes_html() {
        let record = AnalysisRecord {
            title: Some("<script>alert(1)</script>".to_string()),
            keywords: Some(vec!["a&b".to_string()]),
            main_conclusions: Some(vec!["x < y".to_string()]),
            ..Default::default()
        };
        let screen = render_screen_view(&record);

        assert!(!screen.contains("<script>"));
        assert!(screen.contains("&lt;script&gt;"));
        assert!(screen.contains(r#"<span class="tag">a&amp;b</span>"#));
        assert!(screen.contains("<li>x &lt; y</li>"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let record = foo_bar();
        assert_eq!(render_screen_view(&record), render_screen_view(&record));
        assert_eq!(render_markdown_report(&record), render_markdown_report(&record));
    }
}
