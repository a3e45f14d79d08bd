use log::trace;
use oxc_span::SourceType;
use std::{fs, path::Path};

use crate::error::{Result, SizeError};

/// Picks the parser flavour for a declaration file or bundle.
///
/// `.d.ts`/`.d.mts`/`.d.cts` are parsed as TypeScript definitions; anything
/// else is treated as an ES module, which is what bundlers emit.
pub fn source_type_for(path: &Path) -> SourceType {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str());

    let is_definition =
        name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts");

    let st = if is_definition {
        SourceType::d_ts()
    } else {
        SourceType::mjs()
            .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
            .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
    };
    trace!("Source type for {}: {:?}", path.display(), st);
    st
}

/// Reads an input file, mapping a missing path to `MissingInput`.
pub fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(SizeError::MissingInput { path: path.to_path_buf() });
    }
    fs::read_to_string(path).map_err(|e| SizeError::io(path, e))
}
