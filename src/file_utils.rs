//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use std::path::PathBuf;

use crate::error::{ia_err, FMError};

/// Expand a leading `~/` to the user's home directory.
pub(crate) fn expand_user_home(file_path: &str) -> Result<PathBuf, FMError> {
    if let Some(rest) = file_path
        .strip_prefix("~/")
        .or_else(|| file_path.strip_prefix("~\\"))
    {
        return match dirs::home_dir() {
            Some(home_dir) => Ok(home_dir.join(correct_path(rest))),
            None => ia_err!("cannot expand {}: no home directory", file_path),
        };
    }
    Ok(PathBuf::from(file_path))
}

fn correct_path(file_path: &str) -> String {
    if cfg!(target_os = "windows") {
        file_path.replace('/', "\\")
    } else {
        file_path.to_string()
    }
}

pub(crate) fn file_to_string(file_path: &str) -> Result<String, FMError> {
    let path = expand_user_home(file_path)?;
    match std::fs::read_to_string(&path) {
        Ok(s) => Ok(s),
        Err(e) => ia_err!("error reading file {}: {}", path.display(), e),
    }
}
