//! Integration tests for the CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn codebook() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("codebook"))
}

#[test]
fn test_cli_help() {
    codebook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("chapter"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn test_book_requires_title() {
    codebook()
        .args(["book", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--title"));
}

#[test]
fn test_book_rejects_zero_volumes() {
    codebook()
        .args(["book", "-t", "Book", "-n", "0", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("0"));
}

#[test]
fn test_book_rejects_missing_directory() {
    let dir = TempDir::new().expect("temp dir");
    codebook()
        .args(["book", "-t", "Book"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("isn't a directory"));
}

#[test]
fn test_render_requires_config_file() {
    let dir = TempDir::new().expect("temp dir");
    codebook()
        .args(["render", "--config"])
        .arg(dir.path().join("codebook.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("codebook.toml"));
}

#[cfg(unix)]
mod pipeline {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Stands in for pdflatex: section `i` of a document starts on page `10 * i`.
    const FAKE_ENGINE: &str = r#"#!/bin/sh
for arg; do doc="$arg"; done
base="${doc%.tex}"
sed -n 's/^\\input{\(.*\)}$/\1/p' "$doc" > "$base.ids"
i=0
: > "$base.toc"
: > "$base.aux"
while read -r id; do
  i=$((i + 1))
  page=$((i * 10))
  printf '\\contentsline {section}{\\numberline {1.%d}%s}{%d}{section.1.%d}%%\n' "$i" "$id" "$page" "$i" >> "$base.toc"
  printf '\\newlabel{codebook:%s}{{1.%d}{%d}{%s}{section.1.%d}{}}\n' "$id" "$i" "$page" "$id" "$i" >> "$base.aux"
done < "$base.ids"
printf '%%PDF-1.4 %s\n' "$base" > "$base.pdf"
"#;

    const FAILING_ENGINE: &str = "#!/bin/sh\necho '! Emergency stop.' > book.log\nexit 1\n";

    struct Fixture {
        source: TempDir,
        out: TempDir,
        tmp: TempDir,
        tools: TempDir,
    }

    impl Fixture {
        fn new() -> Fixture {
            let fixture = Fixture {
                source: TempDir::new().expect("source dir"),
                out: TempDir::new().expect("out dir"),
                tmp: TempDir::new().expect("tmp dir"),
                tools: TempDir::new().expect("tools dir"),
            };
            for (path, contents) in [
                ("Makefile", "all:\n"),
                ("main.c", "int main(void) { return 0; }\n"),
                ("boot/a20.c", "int a20;\n"),
                ("boot/setup.S", "nop\n"),
            ] {
                let path = fixture.source.path().join(path);
                std::fs::create_dir_all(path.parent().expect("has parent")).expect("dirs");
                std::fs::write(path, contents).expect("source file");
            }
            fixture
        }

        fn engine(&self, script: &str) -> PathBuf {
            let path = self.tools.path().join("fake-latex");
            std::fs::write(&path, script).expect("engine script");
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("engine is executable");
            path
        }

        fn book(&self, engine: &Path) -> Command {
            let mut cmd = codebook();
            cmd.env("TMPDIR", self.tmp.path())
                .args(["book", "-t", "Kernel", "-r", "March 2005", "--engine"])
                .arg(engine)
                .arg("--output-dir")
                .arg(self.out.path())
                .arg(self.source.path());
            cmd
        }

        fn outputs(&self) -> Vec<String> {
            let mut names: Vec<String> = std::fs::read_dir(self.out.path())
                .expect("out dir is readable")
                .map(|e| e.expect("dir entry").file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        }

        fn assert_workspace_removed(&self) {
            let leftovers = std::fs::read_dir(self.tmp.path())
                .expect("tmp dir is readable")
                .count();
            assert_eq!(leftovers, 0, "temporary workspace was left behind");
        }
    }

    #[test]
    fn test_whole_book() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        fixture
            .book(&engine)
            .assert()
            .success()
            .stdout(predicate::str::contains("book.pdf"));

        assert_eq!(fixture.outputs(), vec!["book.pdf"]);
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_split_by_table_of_contents() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        fixture
            .book(&engine)
            .args(["--volumes", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("book_volume_0.pdf"))
            .stdout(predicate::str::contains("book_volume_1.pdf"));

        assert_eq!(
            fixture.outputs(),
            vec!["book_volume_0.pdf", "book_volume_1.pdf"]
        );
        let volume = std::fs::read_to_string(fixture.out.path().join("book_volume_1.pdf"))
            .expect("volume pdf is readable");
        assert!(volume.contains("book_volume_1"));
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_split_by_labels() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        fixture
            .book(&engine)
            .args(["--volumes", "3", "--page-lookup", "labels"])
            .assert()
            .success();

        assert_eq!(
            fixture.outputs(),
            vec!["book_volume_0.pdf", "book_volume_1.pdf", "book_volume_2.pdf"]
        );
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_too_many_volumes() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        fixture
            .book(&engine)
            .args(["--volumes", "50"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("request fewer volumes"));

        assert!(fixture.outputs().is_empty());
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_failing_engine_cleans_up() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAILING_ENGINE);
        fixture
            .book(&engine)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to compile Kernel"))
            .stderr(predicate::str::contains("Emergency stop"));

        assert!(fixture.outputs().is_empty());
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_chapter_keeps_tex() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        codebook()
            .env("TMPDIR", fixture.tmp.path())
            .args(["chapter", "--keep-tex", "--engine"])
            .arg(&engine)
            .arg("--output-dir")
            .arg(fixture.out.path())
            .arg("--parent")
            .arg(fixture.source.path())
            .arg(fixture.source.path().join("boot/a20.c"))
            .assert()
            .success();

        assert_eq!(fixture.outputs(), vec!["boot_a20_c.pdf", "boot_a20_c.tex"]);
        let tex = std::fs::read_to_string(fixture.out.path().join("boot_a20_c.tex"))
            .expect("tex is readable");
        assert!(tex.contains(r"\section*{boot/a20.c}"));
        fixture.assert_workspace_removed();
    }

    #[test]
    fn test_render_from_config_file() {
        let fixture = Fixture::new();
        let engine = fixture.engine(FAKE_ENGINE);
        let config = fixture.tools.path().join("codebook.toml");
        std::fs::write(
            &config,
            format!(
                "[book]\ndirectory = {:?}\ntitle = \"Kernel\"\nvolumes = 2\noutput_dir = {:?}\nexclude = [\"*.S\"]\n\n[latex]\nengine = {:?}\n",
                fixture.source.path().display().to_string(),
                fixture.out.path().display().to_string(),
                engine.display().to_string(),
            ),
        )
        .expect("config file");

        codebook()
            .env("TMPDIR", fixture.tmp.path())
            .args(["render", "--config"])
            .arg(&config)
            .assert()
            .success();

        assert_eq!(
            fixture.outputs(),
            vec!["book_volume_0.pdf", "book_volume_1.pdf"]
        );
        fixture.assert_workspace_removed();
    }
}
