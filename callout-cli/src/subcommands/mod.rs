pub(crate) mod check;
pub(crate) mod convert;
pub(crate) mod inspect;

use std::path::Path;

use crate::error::Error;

/// Read a whole document.
pub(crate) fn read_document(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
