//! End-to-end test suite for constviz-core over temporary project trees.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("constviz_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn id_of(root: &Path, rel: &str) -> String {
    root.join(rel).to_string_lossy().to_string()
}

const LIMITS_CS: &str = r#"namespace Acme.Core
{
    public static class Limits
    {
        public const int MaxItems = 100;
        public const string Name = nameof(Name);
    }
}
"#;

const SETTINGS_VB: &str = r#"Namespace Acme.Legacy
    Public Module Settings
        Public Const Timeout As Integer = 30
    End Module
End Namespace
"#;

// Core Test 1: mixed-language project with default configuration
#[test]
fn test_default_config_indexes_csharp_only() {
    let root = setup_temp_project();
    write_file(&root.join("src/Limits.cs"), LIMITS_CS);
    write_file(&root.join("src/Settings.vb"), SETTINGS_VB);

    let project = Constviz::new(&root).index().unwrap();
    assert_eq!(project.files.len(), 2);
    assert_eq!(project.summary.indexed_units, 1);
    assert_eq!(project.summary.skipped_units, 1);
    assert_eq!(
        project.index.resolve("MaxItems", "Limits", "Program.cs"),
        Some("100")
    );
    assert_eq!(project.index.resolve("Name", "", "Program.cs"), Some("Name"));
    assert_eq!(project.index.resolve("Timeout", "", "Program.cs"), None);

    fs::remove_dir_all(&root).ok();
}

// Core Test 2: configuration file enables Visual Basic
#[test]
fn test_config_file_enables_visual_basic() {
    let root = setup_temp_project();
    write_file(&root.join("src/Limits.cs"), LIMITS_CS);
    write_file(&root.join("src/Settings.vb"), SETTINGS_VB);
    write_file(
        &root.join(config::CONFIG_FILE_NAME),
        "[languages]\nvisual_basic = true\n",
    );

    let project = Constviz::new(&root).index().unwrap();
    assert_eq!(project.summary.indexed_units, 2);
    assert_eq!(
        project.index.resolve("Timeout", "Settings", "Form1.vb"),
        Some("30")
    );
    assert_eq!(
        project.index.resolve("Timeout", "Acme.Legacy.Settings", "Form1.vb"),
        Some("30")
    );
    assert_eq!(project.index.resolve("Timeout", "Legacy", "Form1.vb"), None);

    fs::remove_dir_all(&root).ok();
}

// Core Test 3: builder overrides beat the file
#[test]
fn test_builder_overrides_config_file() {
    let root = setup_temp_project();
    write_file(&root.join("Limits.cs"), LIMITS_CS);
    write_file(&root.join("Settings.vb"), SETTINGS_VB);
    write_file(
        &root.join(config::CONFIG_FILE_NAME),
        "[languages]\nvisual_basic = true\n",
    );

    let project = Constviz::new(&root).csharp(false).visual_basic(false).index().unwrap();
    assert!(project.index.is_ready());
    assert!(project.index.is_empty());

    fs::remove_dir_all(&root).ok();
}

// Core Test 4: the current unit shadows other units
#[test]
fn test_current_source_takes_priority() {
    let root = setup_temp_project();
    write_file(&root.join("a/First.cs"), "class Conf { const int Port = 80; }");
    write_file(&root.join("b/Second.cs"), "class Conf { const int Port = 8080; }");

    let project = Constviz::new(&root).index().unwrap();
    let first = id_of(&root, "a/First.cs");
    let second = id_of(&root, "b/Second.cs");

    assert_eq!(project.index.resolve("Port", "", &second), Some("8080"));
    assert_eq!(project.index.resolve("Port", "", &first), Some("80"));
    // Elsewhere, the first unit in scan order wins.
    assert_eq!(project.index.resolve("Port", "Conf", "Other.cs"), Some("80"));

    fs::remove_dir_all(&root).ok();
}

// Core Test 5: one broken file does not stop the rest
#[test]
fn test_broken_unit_is_isolated() {
    let root = setup_temp_project();
    write_file(&root.join("Good.cs"), "class G { const int Ok = 1; }");
    write_file(&root.join("Broken.cs"), "class B { const string S = \"open; }");

    let project = Constviz::new(&root).index().unwrap();
    assert!(project.index.is_ready());
    assert_eq!(project.summary.failed_units.len(), 1);
    assert!(project.summary.failed_units[0].0.ends_with("Broken.cs"));
    assert_eq!(project.index.resolve("Ok", "", "x.cs"), Some("1"));

    fs::remove_dir_all(&root).ok();
}

// Core Test 6: generated files and build output are ignored
#[test]
fn test_generated_and_build_output_ignored() {
    let root = setup_temp_project();
    write_file(&root.join("Form1.cs"), "class Form1 { const int Real = 1; }");
    write_file(&root.join("Form1.Designer.cs"), "class Form1 { const int Designer = 2; }");
    write_file(&root.join("obj/Debug/App.cs"), "class App { const int Obj = 3; }");
    write_file(&root.join("bin/Out.cs"), "class Out { const int Bin = 4; }");

    let project = Constviz::new(&root).index().unwrap();
    assert_eq!(project.files.len(), 2);
    assert_eq!(project.summary.skipped_units, 1);
    let names: Vec<_> = project.index.records().map(|r| r.identifier.as_str()).collect();
    assert_eq!(names, vec!["Real"]);

    fs::remove_dir_all(&root).ok();
}

// Core Test 7: editing a file updates only that unit
#[test]
fn test_incremental_update_after_edit() {
    let root = setup_temp_project();
    let path = root.join("Limits.cs");
    write_file(&path, LIMITS_CS);
    write_file(&root.join("Other.cs"), "class O { const int Keep = 7; }");

    let ProjectIndex {
        mut index, config, ..
    } = Constviz::new(&root).index().unwrap();

    // Same content again: fingerprint hit.
    let unit = load_unit(&path).unwrap().unwrap();
    assert_eq!(index.update_unit_text(&unit, &config).unwrap(), UnitOutcome::Unchanged);

    write_file(&path, &LIMITS_CS.replace("100", "250"));
    let unit = load_unit(&path).unwrap().unwrap();
    assert_eq!(index.update_unit_text(&unit, &config).unwrap(), UnitOutcome::Updated(2));
    assert_eq!(index.resolve("MaxItems", "", "x.cs"), Some("250"));
    assert_eq!(index.resolve("Keep", "", "x.cs"), Some("7"));

    // A broken edit keeps the last good records.
    write_file(&path, "class Limits { const int MaxItems = \"bad; }");
    let unit = load_unit(&path).unwrap().unwrap();
    assert!(index.update_unit_text(&unit, &config).is_err());
    assert_eq!(index.resolve("MaxItems", "", "x.cs"), Some("250"));

    assert!(index.remove_unit(&unit.id));
    assert_eq!(index.resolve("MaxItems", "", "x.cs"), None);

    fs::remove_dir_all(&root).ok();
}

// Core Test 8: annotate lines of a file against the project index
#[test]
fn test_annotate_project_lines() {
    let root = setup_temp_project();
    write_file(&root.join("Limits.cs"), LIMITS_CS);
    let program = root.join("Program.cs");
    write_file(
        &program,
        "class Program\n{\n    int size = Limits.MaxItems * 2;\n    string s = \"MaxItems\";\n}\n",
    );

    let project = Constviz::new(&root).index().unwrap();
    let source = program.to_string_lossy().to_string();
    let text = fs::read_to_string(&program).unwrap();
    let annotator = LineAnnotator::new(&project.index);

    let found: Vec<(usize, Vec<LineAnnotation>)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, annotator.annotate(line, &source)))
        .filter(|(_, a)| !a.is_empty())
        .collect();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, 3);
    assert_eq!(found[0].1[0].identifier, "MaxItems");
    assert_eq!(found[0].1[0].display, "100");
    assert_eq!(found[0].1[0].offset, "    int size = Limits.".len());

    fs::remove_dir_all(&root).ok();
}

// Extended Test 1: stepped rebuild interleaved with reads
#[test]
fn test_stepped_rebuild_allows_reads_between_units() {
    let root = setup_temp_project();
    for i in 0..5 {
        write_file(
            &root.join(format!("U{i}.cs")),
            &format!("class U{i} {{ const int V{i} = {i}; }}"),
        );
    }
    let files = gather_source_files(&root, &[]).unwrap();
    let units = load_units(&files);

    let mut index = ConstantIndex::new();
    let config = ConstvizConfig::default();
    let mut job = index.begin_rebuild(units, &config).unwrap();
    assert!(matches!(
        index.begin_rebuild(Vec::new(), &config),
        Err(ConstvizError::RebuildInFlight)
    ));

    let mut steps = 0;
    loop {
        match job.step(&mut index) {
            RebuildStep::Processed { .. } => {
                steps += 1;
                assert_eq!(index.len(), steps);
                assert_eq!(index.resolve("V0", "", "x.cs"), None);
            }
            RebuildStep::Finished(summary) => {
                assert_eq!(summary.records, 5);
                break;
            }
            RebuildStep::Cancelled => panic!("rebuild cancelled"),
        }
    }
    assert_eq!(steps, 5);
    assert_eq!(index.resolve("V4", "U4", "x.cs"), Some("4"));

    fs::remove_dir_all(&root).ok();
}

// Extended Test 2: many files indexed in parallel stay deterministic
#[test]
fn test_parallel_scan_is_deterministic() {
    let root = setup_temp_project();
    for i in 0..60 {
        write_file(
            &root.join(format!("dir{}/File{:02}.cs", i % 6, i)),
            &format!("namespace N{i} {{ class C {{ const int Id = {i}; }} }}"),
        );
    }

    let a = Constviz::new(&root).index().unwrap();
    let b = Constviz::new(&root).index().unwrap();
    let first: Vec<_> = a.index.records().cloned().collect();
    let second: Vec<_> = b.index.records().cloned().collect();
    assert_eq!(first.len(), 60);
    assert_eq!(first, second);
    assert_eq!(a.index.resolve("Id", "N42.C", "x.cs"), Some("42"));

    fs::remove_dir_all(&root).ok();
}
