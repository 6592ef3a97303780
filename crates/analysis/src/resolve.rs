use crate::error::{AnalysisError, Result};

/// Specifiers starting with `.` are relative to the importing file.
#[must_use]
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Rewrite a relative `specifier` into a repo-root-relative path based on the
/// directory of `importer`. Bare specifiers are returned unchanged.
///
/// No existence check is made; `"./b"` from `"a/x.ts"` is `"a/b"` whether or
/// not `a/b.ts` exists.
pub fn resolve_import_path(importer: &str, specifier: &str) -> Result<String> {
    if !is_relative_specifier(specifier) {
        return Ok(specifier.to_string());
    }

    let mut segments: Vec<&str> = importer.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();

    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AnalysisError::EscapesRoot {
                        importer: importer.to_string(),
                        specifier: specifier.to_string(),
                    });
                }
            }
            other => segments.push(other),
        }
    }

    Ok(segments.join("/"))
}
