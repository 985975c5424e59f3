// This module is the text side of the generator. Formatter accumulates indented lines of Rust
// source; the fmtln! macro formats straight into it. Streams groups the three formatters the
// emitter writes in lock-step (implementation, declarations, array instantiations) and opens
// and closes the same region markers in all three so the artifacts stay structurally aligned.
// Artifacts is the finished text of a run, and OutputSink owns the three destination files:
// it opens all of them before any generation happens and only writes once a complete set of
// artifacts exists, so a failed run never leaves half-written output behind.

//! Source formatting, the three output streams and the file sink.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};

const INDENT: &str = "    ";

/// Format one line into a [`Formatter`].
#[macro_export]
macro_rules! fmtln {
    ($fmt:expr, $($arg:tt)*) => {
        $fmt.line(format!($($arg)*))
    };
}

/// Indented line buffer for generated Rust source.
#[derive(Debug, Default)]
pub struct Formatter {
    indent: usize,
    lines: Vec<String>,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent_push(&mut self) {
        self.indent += 1;
    }

    pub fn indent_pop(&mut self) {
        assert!(self.indent > 0, "indent underflow");
        self.indent -= 1;
    }

    /// Run `f` one level deeper.
    pub fn indent<T>(&mut self, f: impl FnOnce(&mut Formatter) -> T) -> T {
        self.indent_push();
        let ret = f(self);
        self.indent_pop();
        ret
    }

    pub fn line(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if s.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{s}", INDENT.repeat(self.indent)));
        }
    }

    pub fn empty_line(&mut self) {
        self.lines.push(String::new());
    }

    pub fn comment(&mut self, s: impl AsRef<str>) {
        fmtln!(self, "// {}", s.as_ref());
    }

    /// Emit `s` as `///` lines, one per line of input.
    pub fn doc_comment(&mut self, s: impl AsRef<str>) {
        for l in s.as_ref().lines() {
            if l.is_empty() {
                self.line("///");
            } else {
                fmtln!(self, "/// {l}");
            }
        }
    }

    /// Emit `{head} {{`, the body one level deeper, then `{tail}`.
    pub fn block<T>(&mut self, head: impl AsRef<str>, tail: &str, f: impl FnOnce(&mut Formatter) -> T) -> T {
        fmtln!(self, "{} {{", head.as_ref());
        let ret = self.indent(f);
        self.line(tail);
        ret
    }

    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// The three lock-step output streams of one generation run.
#[derive(Debug, Default)]
pub struct Streams {
    /// Variants, variant lists and resolved backends.
    pub implementation: Formatter,
    /// Traits, entry-point impls and macros.
    pub declarations: Formatter,
    /// Fixed-size array backends.
    pub instantiations: Formatter,
}

impl Streams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&mut self) -> [&mut Formatter; 3] {
        [
            &mut self.implementation,
            &mut self.declarations,
            &mut self.instantiations,
        ]
    }

    /// Write the generated-file header to every stream.
    pub fn header(&mut self, description: [&str; 3]) {
        for (fmt, what) in self.all().into_iter().zip(description) {
            fmtln!(fmt, "// @generated by lanewise-gen {}. Do not edit.", env!("CARGO_PKG_VERSION"));
            fmt.comment(what);
            fmt.empty_line();
        }
    }

    pub fn open_region(&mut self, name: &str) {
        for fmt in self.all() {
            fmtln!(fmt, "// region: {name}");
        }
    }

    pub fn close_region(&mut self) {
        for fmt in self.all() {
            fmt.line("// endregion:");
            fmt.empty_line();
        }
    }

    /// Run `f` inside a region opened and closed on all three streams.
    pub fn region<T>(&mut self, name: &str, f: impl FnOnce(&mut Streams) -> GenResult<T>) -> GenResult<T> {
        self.open_region(name);
        let ret = f(self)?;
        self.close_region();
        Ok(ret)
    }

    pub fn finish(self) -> Artifacts {
        Artifacts {
            implementation: self.implementation.text(),
            declarations: self.declarations.text(),
            instantiations: self.instantiations.text(),
        }
    }
}

/// Finished text of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub implementation: String,
    pub declarations: String,
    pub instantiations: String,
}

impl Artifacts {
    /// File names, in stream order.
    pub const FILE_NAMES: [&'static str; 3] = ["kernels.rs", "api.rs", "arrays.rs"];

    pub fn texts(&self) -> [&str; 3] {
        [&self.implementation, &self.declarations, &self.instantiations]
    }
}

/// The three destination files, opened up front.
#[derive(Debug)]
pub struct OutputSink {
    files: Vec<(PathBuf, File)>,
}

impl OutputSink {
    /// Create (or truncate) the three artifact files in `dir`.
    pub fn open(dir: &Path) -> GenResult<Self> {
        let mut files = Vec::with_capacity(Artifacts::FILE_NAMES.len());
        for name in Artifacts::FILE_NAMES {
            let path = dir.join(name);
            let file = File::create(&path).map_err(|source| GenError::OpenSink {
                path: path.clone(),
                source,
            })?;
            files.push((path, file));
        }
        log::debug!("opened output sink in {}", dir.display());
        Ok(Self { files })
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|(path, _)| path.as_path())
    }

    /// Write the artifacts and close the files.
    pub fn commit(self, artifacts: &Artifacts) -> GenResult<()> {
        for ((path, mut file), text) in self.files.into_iter().zip(artifacts.texts()) {
            file.write_all(text.as_bytes())
                .and_then(|()| file.flush())
                .map_err(|source| GenError::WriteSink {
                    path: path.clone(),
                    source,
                })?;
            log::debug!("wrote {} ({} bytes)", path.display(), text.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_indents() {
        let mut fmt = Formatter::new();
        fmt.block("fn f()", "}", |fmt| {
            fmt.line("let x = 1;");
            fmt.empty_line();
            fmt.block("if x == 1", "}", |fmt| fmtln!(fmt, "return {};", 2));
        });
        assert_eq!(
            fmt.text(),
            "fn f() {\n    let x = 1;\n\n    if x == 1 {\n        return 2;\n    }\n}\n"
        );
    }

    #[test]
    fn test_doc_comment_lines() {
        let mut fmt = Formatter::new();
        fmt.doc_comment("First.\n\nSecond.");
        assert_eq!(fmt.text(), "/// First.\n///\n/// Second.\n");
    }

    #[test]
    fn test_regions_are_lock_step() {
        let mut streams = Streams::new();
        streams
            .region("add", |s| {
                s.region("add/i32", |s| {
                    s.implementation.line("fn body() {}");
                    Ok(())
                })
            })
            .unwrap();
        let artifacts = streams.finish();
        for text in artifacts.texts() {
            let markers: Vec<_> = text.lines().filter(|l| l.starts_with("// ")).collect();
            assert_eq!(markers, ["// region: add", "// region: add/i32", "// endregion:", "// endregion:"]);
        }
    }

    #[test]
    fn test_sink_writes_each_stream_to_its_file() {
        let dir = std::env::temp_dir().join(format!("lanewise-gen-sink-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let sink = OutputSink::open(&dir).unwrap();
        let names: Vec<_> = sink.paths().map(|p| p.file_name().unwrap().to_str().unwrap().to_owned()).collect();
        assert_eq!(names, Artifacts::FILE_NAMES);
        let paths: Vec<PathBuf> = sink.paths().map(Path::to_path_buf).collect();

        let artifacts = Artifacts {
            implementation: "// kernels\n".into(),
            declarations: "// api\n".into(),
            instantiations: "// arrays\n".into(),
        };
        sink.commit(&artifacts).unwrap();
        for (path, text) in paths.iter().zip(artifacts.texts()) {
            assert_eq!(std::fs::read_to_string(path).unwrap(), text);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = std::env::temp_dir().join("lanewise-gen-no-such-dir").join("nested");
        let err = OutputSink::open(&dir).unwrap_err();
        assert!(matches!(err, GenError::OpenSink { .. }));
        assert!(err.to_string().contains("kernels.rs"));
    }
}
