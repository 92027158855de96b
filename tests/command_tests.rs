//! Tests for the publish_hits and dump_results commands.
//!
//! Each module starts from an empty in-memory database and runs the commands
//! against the fixtures in `tests/resources/`.

use hits::commands::dump::{DumpOptions, dump_results, results_data};
use hits::commands::publish::{PublishSummary, publish_hits, row_fields};
use hits::csv_input::{CsvOptions, parse_csv_file};
use hits::db::Database;
use hits::error::CsvError;
use hits::store::HitStore;
use hits::types::{FieldMap, Hit, HitTemplate};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

/// Publish a fixture pair and return the summary and the status output.
fn publish(db: &Database, template: &str, csv: &str) -> (PublishSummary, String) {
    let mut status = Vec::new();
    let summary = publish_hits(
        db,
        &resource(template),
        &resource(csv),
        &CsvOptions::default(),
        &mut status,
    )
    .expect("publish_hits failed");
    (summary, String::from_utf8(status).unwrap())
}

mod parse_and_create {
    use super::*;

    #[test]
    fn parsed_row_becomes_hit_fields() {
        let csv = "h0,h1\r\n\"é0\",ñ0\r\n\"é1, e1\",ñ1".as_bytes();
        let (header, rows) = parse_csv_file(csv, &CsvOptions::default()).unwrap();
        let rows: Vec<Vec<String>> = rows.collect::<Result<_, _>>().unwrap();
        assert_eq!(header, vec!["h0", "h1"]);
        assert_eq!(rows, vec![vec!["é0", "ñ0"], vec!["é1, e1", "ñ1"]]);

        let db = setup_db();
        let (template, _) = db.find_or_create_template("test", "<p></p>").unwrap();
        let hit = db
            .create_hit(template.id, &row_fields(&header, rows[1].clone(), 2))
            .unwrap();

        let expected: FieldMap = [("h0", "é1, e1"), ("h1", "ñ1")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(db.get_hit(hit.id).unwrap().unwrap().input_csv_fields, expected);
    }
}

mod publish_handle {
    use super::*;

    #[test]
    fn status_line_reports_count() {
        let db = setup_db();
        let (summary, status) = publish(&db, "form_1.html", "form_1_vals.csv");

        assert_eq!(status, "Creating HITs: 1 HITs created.\n");
        assert_eq!(summary.hits_created, 1);
        assert!(summary.template_created);
    }

    #[test]
    fn creates_one_template_and_one_hit() {
        let db = setup_db();
        publish(&db, "form_1.html", "form_1_vals.csv");

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.templates, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn newline_only_csv_gives_same_hit() {
        let crlf_db = setup_db();
        let lf_db = setup_db();
        let (crlf, status_crlf) = publish(&crlf_db, "form_1.html", "form_1_vals.csv");
        let (lf, status_lf) = publish(&lf_db, "form_1.html", "form_1_vals_newline_ending.csv");

        assert_eq!(status_crlf, status_lf);
        let crlf_hits = crlf_db.hits_for_template(crlf.template.id).unwrap();
        let lf_hits = lf_db.hits_for_template(lf.template.id).unwrap();
        assert_eq!(crlf_hits.len(), 1);
        assert_eq!(crlf_hits[0].input_csv_fields, lf_hits[0].input_csv_fields);
        assert_eq!(
            crlf_hits[0].input_csv_fields["sentence"],
            "Él dijo: \"hola\", y se fue."
        );
    }
}

mod publish_form_0 {
    use super::*;

    #[test]
    fn template_name_is_absolute_path() {
        let db = setup_db();
        let (summary, _) = publish(&db, "form_0.html", "form_0_vals.csv");

        let expected = std::path::absolute(resource("form_0.html")).unwrap();
        assert_eq!(summary.template.name, expected.to_string_lossy());
        assert!(db.get_template_by_name(&summary.template.name).unwrap().is_some());
    }

    #[test]
    fn template_form_is_stored_verbatim() {
        let db = setup_db();
        let (summary, _) = publish(&db, "form_0.html", "form_0_vals.csv");

        let expected = std::fs::read_to_string(resource("form_0.html")).unwrap();
        assert_eq!(db.get_template(summary.template.id).unwrap().form, expected);
    }

    #[test]
    fn hit_fields_preserve_non_ascii() {
        let db = setup_db();
        let (summary, _) = publish(&db, "form_0.html", "form_0_vals.csv");

        let hits = db.hits_for_template(summary.template.id).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].input_csv_fields["foo"], "Ça va, merci");
        assert_eq!(hits[0].input_csv_fields["bar"], "ñandú");
    }
}

mod publish_more {
    use super::*;

    #[test]
    fn publishing_twice_reuses_template_and_adds_hits() {
        let db = setup_db();
        let (first, _) = publish(&db, "form_1.html", "form_1_vals.csv");
        let (second, status) = publish(&db, "form_1.html", "form_1_vals.csv");

        assert_eq!(status, "Creating HITs: 1 HITs created.\n");
        assert_eq!(first.template.id, second.template.id);
        assert!(!second.template_created);

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.templates, 1);
        assert_eq!(stats.hits, 2);
    }
}

mod publish_errors {
    use super::*;

    #[test]
    fn missing_template_file_fails_before_creating_anything() {
        let db = setup_db();
        let mut status = Vec::new();

        let err = publish_hits(
            &db,
            &resource("no_such_form.html"),
            &resource("form_1_vals.csv"),
            &CsvOptions::default(),
            &mut status,
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to read template"));
        assert!(err.downcast_ref::<std::io::Error>().is_some());
        assert!(status.is_empty());
        assert_eq!(db.get_stats().unwrap().templates, 0);
    }

    #[test]
    fn unterminated_quote_is_a_parse_failure() {
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("broken.csv");
        std::fs::write(&csv_path, "h0,h1\r\nok,\"never closed\r\n").unwrap();
        let db = setup_db();
        let mut status = Vec::new();

        let err = publish_hits(
            &db,
            &resource("form_1.html"),
            &csv_path,
            &CsvOptions::default(),
            &mut status,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CsvError>(),
            Some(CsvError::UnterminatedQuote { line: 2 })
        ));
        assert_eq!(db.get_stats().unwrap().hits, 0);
    }

    #[test]
    fn missing_csv_file_fails() {
        let db = setup_db();
        let mut status = Vec::new();

        let result = publish_hits(
            &db,
            &resource("form_1.html"),
            &resource("missing.csv"),
            &CsvOptions::default(),
            &mut status,
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to open CSV"));
        let stats = db.get_stats().unwrap();
        // The template is stored before the CSV is opened.
        assert_eq!(stats.templates, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn header_only_csv_creates_no_hits() {
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("empty.csv");
        std::fs::write(&csv_path, "h0,h1\r\n").unwrap();
        let db = setup_db();
        let mut status = Vec::new();

        let summary = publish_hits(
            &db,
            &resource("form_1.html"),
            &csv_path,
            &CsvOptions::default(),
            &mut status,
        )
        .unwrap();

        assert_eq!(summary.hits_created, 0);
        assert_eq!(String::from_utf8(status).unwrap(), "Creating HITs: 0 HITs created.\n");
    }
}

mod dump {
    use super::*;

    fn answers() -> FieldMap {
        [("foo", "foo_answer"), ("bar", "bar_answer")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Publish form_0, complete its single HIT and return the database.
    fn published_and_completed() -> Database {
        let db = setup_db();
        let (summary, _) = publish(&db, "form_0.html", "form_0_vals.csv");
        let hit = &db.hits_for_template(summary.template.id).unwrap()[0];
        db.complete_hit(hit.id, &answers()).unwrap();
        db
    }

    #[test]
    fn one_completed_hit() {
        let db = published_and_completed();
        assert_eq!(db.completed_hits(None).unwrap().len(), 1);
    }

    #[test]
    fn unicode_through_results_data() {
        let db = published_and_completed();
        let hits = db.completed_hits(None).unwrap();

        let (header, rows) = results_data(&hits);

        assert_eq!(
            header,
            vec!["Input.bar", "Input.foo", "Answer.bar", "Answer.foo"]
        );
        assert_eq!(
            rows,
            vec![vec!["ñandú", "Ça va, merci", "bar_answer", "foo_answer"]]
        );
    }

    #[test]
    fn dump_results_writes_csv() {
        let db = published_and_completed();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv");

        let summary = dump_results(
            &db,
            &resource("form_0.html"),
            &output,
            &DumpOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.rows_written, 1);
        assert!(!summary.compressed);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Input.bar,Input.foo,Answer.bar,Answer.foo\r\n\
             ñandú,\"Ça va, merci\",bar_answer,foo_answer\r\n"
        );
    }

    #[test]
    fn dump_output_reparses_with_csv_reader() {
        let db = published_and_completed();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv");
        dump_results(&db, &resource("form_0.html"), &output, &DumpOptions::default()).unwrap();

        let file = std::fs::File::open(&output).unwrap();
        let (header, rows) = parse_csv_file(file, &CsvOptions::default()).unwrap();
        let rows: Vec<Vec<String>> = rows.collect::<Result<_, _>>().unwrap();

        assert_eq!(header[1], "Input.foo");
        assert_eq!(rows[0][1], "Ça va, merci");
    }

    #[test]
    fn dump_results_gzip_by_extension() {
        use std::io::Read;

        let db = published_and_completed();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv.gz");

        let summary =
            dump_results(&db, &resource("form_0.html"), &output, &DumpOptions::default()).unwrap();
        assert!(summary.compressed);

        let mut text = String::new();
        flate2::read::GzDecoder::new(std::fs::File::open(&output).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.starts_with("Input.bar,Input.foo,Answer.bar,Answer.foo\r\n"));
        assert!(text.contains("ñandú"));
    }

    #[test]
    fn incomplete_hits_are_not_dumped() {
        let db = setup_db();
        publish(&db, "form_0.html", "form_0_vals.csv");
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv");

        let summary =
            dump_results(&db, &resource("form_0.html"), &output, &DumpOptions::default()).unwrap();

        assert_eq!(summary.rows_written, 0);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn other_templates_are_not_dumped() {
        let db = published_and_completed();
        let (summary, _) = publish(&db, "form_1.html", "form_1_vals.csv");
        let other = &db.hits_for_template(summary.template.id).unwrap()[0];
        db.complete_hit(other.id, &answers()).unwrap();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv");

        let summary =
            dump_results(&db, &resource("form_1.html"), &output, &DumpOptions::default()).unwrap();

        assert_eq!(summary.rows_written, 1);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("Input.id,Input.sentence,"));
        assert!(!text.contains("ñandú"));
    }
}

/// A store with no database behind it, to check the commands only go
/// through the `HitStore` operations.
#[derive(Default)]
struct MemoryStore {
    templates: RefCell<Vec<HitTemplate>>,
    hits: RefCell<Vec<Hit>>,
    /// Refuse new HITs once this many exist.
    hit_limit: Option<usize>,
}

impl HitStore for MemoryStore {
    fn find_or_create_template(&self, name: &str, form: &str) -> anyhow::Result<(HitTemplate, bool)> {
        let mut templates = self.templates.borrow_mut();
        if let Some(existing) = templates.iter().find(|t| t.name == name) {
            return Ok((existing.clone(), false));
        }
        let template = HitTemplate {
            id: templates.len() as i64 + 1,
            name: name.to_string(),
            form: form.to_string(),
            created_at: 0,
        };
        templates.push(template.clone());
        Ok((template, true))
    }

    fn create_hit(&self, template_id: i64, fields: &FieldMap) -> anyhow::Result<Hit> {
        let mut hits = self.hits.borrow_mut();
        if self.hit_limit.is_some_and(|limit| hits.len() >= limit) {
            anyhow::bail!("store is full");
        }
        let hit = Hit {
            id: hits.len() as i64 + 1,
            template_id,
            input_csv_fields: fields.clone(),
            completed: false,
            answers: FieldMap::new(),
            created_at: 0,
            updated_at: 0,
        };
        hits.push(hit.clone());
        Ok(hit)
    }

    fn completed_hits(&self, template_name: Option<&str>) -> anyhow::Result<Vec<Hit>> {
        let templates = self.templates.borrow();
        Ok(self
            .hits
            .borrow()
            .iter()
            .filter(|h| h.completed)
            .filter(|h| {
                template_name.is_none_or(|name| {
                    templates
                        .iter()
                        .any(|t| t.id == h.template_id && t.name == name)
                })
            })
            .cloned()
            .collect())
    }
}

mod store_port {
    use super::*;

    #[test]
    fn commands_run_against_any_store() {
        let store = MemoryStore::default();
        let mut status = Vec::new();

        publish_hits(
            &store,
            &resource("form_0.html"),
            &resource("form_0_vals.csv"),
            &CsvOptions::default(),
            &mut status,
        )
        .unwrap();
        assert_eq!(store.hits.borrow().len(), 1);

        {
            let mut hits = store.hits.borrow_mut();
            hits[0].completed = true;
            hits[0].answers.insert("foo".to_string(), "sí".to_string());
        }

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.csv");
        let summary =
            dump_results(&store, &resource("form_0.html"), &output, &DumpOptions::default())
                .unwrap();

        assert_eq!(summary.rows_written, 1);
        assert!(std::fs::read_to_string(&output).unwrap().contains(",sí\r\n"));
    }

    #[test]
    fn failed_publish_ends_the_status_line() {
        let store = MemoryStore {
            hit_limit: Some(1),
            ..MemoryStore::default()
        };
        let temp = TempDir::new().unwrap();
        let csv_path = temp.path().join("three.csv");
        std::fs::write(&csv_path, "n\r\n1\r\n2\r\n3\r\n").unwrap();
        let mut status = Vec::new();

        let err = publish_hits(
            &store,
            &resource("form_1.html"),
            &csv_path,
            &CsvOptions::default(),
            &mut status,
        )
        .unwrap_err();

        assert!(err.to_string().contains("store is full"));
        assert_eq!(String::from_utf8(status).unwrap(), "Creating HITs: \n");
        assert_eq!(store.hits.borrow().len(), 1);
    }
}
