use pagefix_core::{
    fix_operation, scan_paths, Answer, Confirm, FixOptions, Mode, OutputFormatter, Proposal,
    ReportFormat, ScanOptions,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, name).unwrap();
    }
}

fn listing(dir: &Path) -> String {
    let mut names: Vec<String> = walkdir_names(dir);
    names.sort();
    names.join("\n")
}

fn walkdir_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() {
            for child in walkdir_names(&entry.path()) {
                names.push(format!("{name}/{child}"));
            }
        } else {
            names.push(name);
        }
    }
    names
}

fn write_cbz(path: &Path, entries: &[&str]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for name in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(name.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn run(root: &Path, mode: Mode, recursive: bool) -> (pagefix_core::RunResult, String) {
    let options = FixOptions {
        scan: ScanOptions {
            recursive,
            ..ScanOptions::default()
        },
        mode,
        ..FixOptions::default()
    };
    fix_operation(&[root.to_path_buf()], &options, None).unwrap()
}

#[test]
fn test_mixed_conventions_are_normalized() {
    let temp_dir = TempDir::new().unwrap();
    touch(
        temp_dir.path(),
        &[
            "page012_013.jpg",
            "ch01 120 130.png",
            "vol2-0405.JPG",
            "cover.jpg",
            "randomfile.jpg",
            "page001-002.jpg",
            "notes.txt",
        ],
    );

    let (result, _) = run(temp_dir.path(), Mode::Apply, false);
    assert_eq!(result.summary().renamed, 3);

    insta::assert_snapshot!(listing(temp_dir.path()), @r"
    ch01 120-130.png
    cover.jpg
    notes.txt
    page001-002.jpg
    page012-013.jpg
    randomfile.jpg
    vol2-04-05.JPG
    ");
}

#[test]
fn test_second_run_finds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), &["a001_002.jpg", "b010&011.png"]);

    run(temp_dir.path(), Mode::Apply, false);
    let (result, rendered) = run(temp_dir.path(), Mode::DryRun, false);

    assert!(result.changes.is_empty());
    assert_eq!(rendered, "");
}

#[test]
fn test_recursive_scan_reaches_nested_directories() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), &["top001_002.jpg", "vol1/p003_004.jpg", ".hidden/p005_006.jpg"]);

    let shallow = scan_paths(&[temp_dir.path().to_path_buf()], &ScanOptions::default()).unwrap();
    assert_eq!(shallow.len(), 1);

    let deep = scan_paths(
        &[temp_dir.path().to_path_buf()],
        &ScanOptions {
            recursive: true,
            ..ScanOptions::default()
        },
    )
    .unwrap();
    let targets: Vec<&str> = deep.proposals.iter().map(|p| p.to.as_str()).collect();
    assert_eq!(targets, vec!["top001-002.jpg", "p003-004.jpg"]);
}

#[test]
fn test_files_and_archives_in_one_run() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), &["loose010_011.jpg"]);
    let cbz = temp_dir.path().join("issue.cbz");
    write_cbz(&cbz, &["p001.jpg", "p002+003.jpg", "p004_005.png"]);
    touch(temp_dir.path(), &["old.cbr"]);

    let (result, _) = run(temp_dir.path(), Mode::Apply, false);
    assert_eq!(result.summary().renamed, 3);
    assert_eq!(result.stats.archives_scanned, 1);
    assert_eq!(result.stats.unsupported_archives, 1);

    let mut archive = zip::ZipArchive::new(File::open(&cbz).unwrap()).unwrap();
    let mut entries: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["p001.jpg", "p002-003.jpg", "p004-005.png"]);

    let mut content = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("p002-003.jpg").unwrap(), &mut content)
        .unwrap();
    assert_eq!(content, "p002+003.jpg");
    assert!(temp_dir.path().join("loose010-011.jpg").exists());
}

#[test]
fn test_json_report_lists_every_change() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), &["p001_002.jpg", "p003_004.jpg", "p003-004.jpg"]);

    let (result, _) = run(temp_dir.path(), Mode::DryRun, false);
    let json: serde_json::Value =
        serde_json::from_str(&result.format(ReportFormat::Json)).unwrap();

    assert_eq!(json["mode"], "dry-run");
    assert_eq!(json["summary"]["would_rename"], 1);
    assert_eq!(json["summary"]["skipped"], 1);

    let changes = json["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["to"], "p001-002.jpg");
    assert_eq!(changes[0]["convention"], "separated");
    assert_eq!(changes[1]["status"], "skipped");
    assert_eq!(changes[1]["reason"], "target exists");
}

struct AlwaysYes(usize);

impl Confirm for AlwaysYes {
    fn confirm(&mut self, _proposal: &Proposal) -> anyhow::Result<Answer> {
        self.0 += 1;
        Ok(Answer::Yes)
    }
}

#[test]
fn test_interactive_prompt_skips_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), &["p001_002.jpg", "p003_004.jpg", "p003-004.jpg"]);

    let mut prompt = AlwaysYes(0);
    let options = FixOptions {
        mode: Mode::Interactive,
        ..FixOptions::default()
    };
    let roots: Vec<PathBuf> = vec![temp_dir.path().to_path_buf()];
    let (result, _) = fix_operation(&roots, &options, Some(&mut prompt)).unwrap();

    assert_eq!(prompt.0, 1);
    assert_eq!(result.summary().renamed, 1);
    assert_eq!(fs::read_to_string(temp_dir.path().join("p003-004.jpg")).unwrap(), "p003-004.jpg");
}
