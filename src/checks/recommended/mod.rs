//! checks::recommended
//!
//! The built-in check set.
//!
//! | Name | Fixable |
//! |------|---------|
//! | `monoguard/has-valid-package-name` | no |
//! | `monoguard/has-unique-dependency-types` | yes |
//! | `monoguard/extends-repository-field` | yes |
//! | `monoguard/ensure-codeowner` | no |

mod codeowner;
mod dependency_types;
mod package_name;
mod repository;

pub use codeowner::EnsureCodeowner;
pub use dependency_types::HasUniqueDependencyTypes;
pub use package_name::HasValidPackageName;
pub use repository::ExtendsRepositoryField;

use serde_json::{Map, Value};
use std::sync::Arc;

use super::{Check, CheckContext, CheckError};

/// Every recommended check.
pub fn all() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(HasValidPackageName),
        Arc::new(HasUniqueDependencyTypes),
        Arc::new(ExtendsRepositoryField),
        Arc::new(EnsureCodeowner),
    ]
}

/// Load the package manifest as an object, for fixes.
async fn load_manifest_object(ctx: &CheckContext) -> Result<Map<String, Value>, CheckError> {
    let file = ctx.package_json();
    match file.load().await? {
        Value::Object(object) => Ok(object),
        _ => Err(CheckError::NotAnObject {
            path: file.path().to_path_buf(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::checks::CheckContext;
    use crate::core::graph::tests::package;

    /// A workspace with a root manifest and one package at `packages/pkg-a`.
    pub(crate) struct Fixture {
        pub dir: TempDir,
    }

    impl Fixture {
        pub(crate) fn new(root: &Value, pkg: Option<&Value>) -> Self {
            let dir = TempDir::new().unwrap();
            write(dir.path(), "package.json", root);
            std::fs::create_dir_all(dir.path().join("packages/pkg-a")).unwrap();
            if let Some(pkg) = pkg {
                write(dir.path(), "packages/pkg-a/package.json", pkg);
            }
            Self { dir }
        }

        pub(crate) fn context(&self) -> CheckContext {
            self.context_with_owners(&[])
        }

        pub(crate) fn context_with_owners(&self, owners: &[&str]) -> CheckContext {
            let mut pkg = package("pkg-a", &[], &[]);
            pkg.owners = owners.iter().map(|o| o.to_string()).collect();
            CheckContext::new(self.dir.path(), Arc::new(pkg))
        }

        pub(crate) fn package_json(&self) -> Value {
            let raw =
                std::fs::read_to_string(self.dir.path().join("packages/pkg-a/package.json"))
                    .unwrap();
            serde_json::from_str(&raw).unwrap()
        }

        pub(crate) fn package_json_bytes(&self) -> Vec<u8> {
            std::fs::read(self.dir.path().join("packages/pkg-a/package.json")).unwrap()
        }
    }

    fn write(root: &Path, relative: &str, value: &Value) {
        std::fs::write(
            root.join(relative),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .unwrap();
    }
}
