//! Resolution of Hardhat build artifacts (`hh-sol-artifact-1`) by contract
//! name and encoding of the creation code for a deployment.
//!
//! Artifacts live under `<root>/<sourceName>/<contractName>.json`. A contract
//! can be referenced by its bare name (`InvoiceNFT`) as long as that name is
//! unique, or by its fully qualified name
//! (`contracts/InvoiceNFT.sol:InvoiceNFT`).

use {
    alloy::{
        dyn_abi::{DynSolType, DynSolValue, Specifier},
        json_abi::JsonAbi,
        primitives::Bytes,
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
    },
    walkdir::WalkDir,
};

/// Directory Hardhat writes its compiler inputs and outputs to. It contains
/// no artifacts.
const BUILD_INFO_DIR: &str = "build-info";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("no compiled artifact found for contract {0:?}")]
    NotFound(String),
    #[error("contract name {name:?} is ambiguous, use one of {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
    #[error("could not read artifacts directory {path:?}")]
    Directory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("could not read artifact {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed artifact {path:?}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("contract {0} is abstract and can't be deployed")]
    Abstract(String),
    #[error("contract {name} references libraries that are not linked: {libraries:?}")]
    UnlinkedLibraries {
        name: String,
        libraries: Vec<String>,
    },
    #[error("artifact for contract {name} contains invalid bytecode")]
    InvalidBytecode {
        name: String,
        #[source]
        source: const_hex::FromHexError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("constructor expects {expected} arguments but {actual} were given")]
    Count { expected: usize, actual: usize },
    #[error("constructor parameter #{position} has unsupported type {ty:?}")]
    UnsupportedType {
        position: usize,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
    #[error("argument #{position} {value:?} is not a valid {ty}")]
    Invalid {
        position: usize,
        value: String,
        ty: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },
}

/// The artifacts directory of a Hardhat project.
#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the artifact of a deployable contract by its bare or fully
    /// qualified name.
    pub fn resolve(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let artifact = match name.split_once(':') {
            Some((source, contract)) => {
                let path = self.root.join(source).join(format!("{contract}.json"));
                if !path.is_file() {
                    return Err(ArtifactError::NotFound(name.to_string()));
                }
                read(&path)?
            }
            None => self.find(name)?,
        };
        tracing::debug!(
            name = %artifact.fully_qualified_name(),
            format = ?artifact.format,
            "resolved artifact"
        );
        artifact.into_deployable()
    }

    fn find(&self, name: &str) -> Result<HardhatArtifact, ArtifactError> {
        let file_name = format!("{name}.json");
        let mut matches = Vec::new();
        let entries = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != BUILD_INFO_DIR);
        for entry in entries {
            let entry = entry.map_err(|source| ArtifactError::Directory {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() || entry.file_name() != file_name.as_str() {
                continue;
            }
            let artifact = read(entry.path())?;
            if artifact.contract_name == name {
                matches.push(artifact);
            }
        }

        match matches.len() {
            0 => Err(ArtifactError::NotFound(name.to_string())),
            1 => Ok(matches.remove(0)),
            _ => {
                let mut candidates: Vec<_> = matches
                    .iter()
                    .map(HardhatArtifact::fully_qualified_name)
                    .collect();
                candidates.sort();
                Err(ArtifactError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }
}

fn read(path: &Path) -> Result<HardhatArtifact, ArtifactError> {
    let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ArtifactError::Malformed {
        path: path.to_owned(),
        source,
    })
}

/// On-disk format of a Hardhat artifact. Only the fields needed to deploy
/// are read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    #[serde(rename = "_format")]
    format: Option<String>,
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl HardhatArtifact {
    fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    fn into_deployable(self) -> Result<Artifact, ArtifactError> {
        let name = self.fully_qualified_name();
        if !self.link_references.is_empty() {
            let libraries = self
                .link_references
                .iter()
                .flat_map(|(source, libraries)| {
                    libraries
                        .keys()
                        .map(move |library| format!("{source}:{library}"))
                })
                .collect();
            return Err(ArtifactError::UnlinkedLibraries { name, libraries });
        }

        let bytecode =
            const_hex::decode(&self.bytecode).map_err(|source| ArtifactError::InvalidBytecode {
                name: name.clone(),
                source,
            })?;
        if bytecode.is_empty() {
            return Err(ArtifactError::Abstract(name));
        }

        Ok(Artifact {
            contract_name: self.contract_name,
            source_name: self.source_name,
            abi: self.abi,
            bytecode: bytecode.into(),
        })
    }
}

/// A deployable contract: its interface and creation bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Creation code of a deployment: the bytecode followed by the ABI
    /// encoded constructor arguments. Every argument is parsed according to
    /// the type of its constructor parameter and is otherwise used verbatim.
    pub fn deploy_code(&self, args: &[String]) -> Result<Bytes, ArgumentError> {
        let params = self
            .abi
            .constructor
            .as_ref()
            .map(|constructor| constructor.inputs.as_slice())
            .unwrap_or_default();
        if params.len() != args.len() {
            return Err(ArgumentError::Count {
                expected: params.len(),
                actual: args.len(),
            });
        }

        let values = params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(position, (param, arg))| {
                let ty: DynSolType =
                    param
                        .resolve()
                        .map_err(|source| ArgumentError::UnsupportedType {
                            position,
                            ty: param.ty.clone(),
                            source,
                        })?;
                ty.coerce_str(arg).map_err(|source| ArgumentError::Invalid {
                    position,
                    value: arg.clone(),
                    ty: ty.sol_type_name().into_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut code = self.bytecode.to_vec();
        if !values.is_empty() {
            code.extend(DynSolValue::Tuple(values).abi_encode_params());
        }
        Ok(code.into())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{U256, address},
        serde_json::json,
        tempfile::TempDir,
    };

    const CREATION_CODE: &str = "0x6080604052";

    fn write(root: &Path, source: &str, artifact: serde_json::Value) {
        let name = artifact["contractName"].as_str().unwrap().to_string();
        let dir = root.join(source);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_string_pretty(&artifact).unwrap(),
        )
        .unwrap();
    }

    fn artifact(
        source: &str,
        name: &str,
        constructor: &[&str],
        bytecode: &str,
    ) -> serde_json::Value {
        let inputs: Vec<_> = constructor
            .iter()
            .enumerate()
            .map(|(i, ty)| json!({ "internalType": ty, "name": format!("arg{i}"), "type": ty }))
            .collect();
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": name,
            "sourceName": source,
            "abi": [{
                "inputs": inputs,
                "stateMutability": "nonpayable",
                "type": "constructor",
            }],
            "bytecode": bytecode,
            "deployedBytecode": bytecode,
            "linkReferences": {},
            "deployedLinkReferences": {},
        })
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/InvoiceNFT.sol",
            artifact(
                "contracts/InvoiceNFT.sol",
                "InvoiceNFT",
                &["address"],
                CREATION_CODE,
            ),
        );
        // Debug files and compiler outputs live next to the artifacts.
        std::fs::write(
            dir.path().join("contracts/InvoiceNFT.sol/InvoiceNFT.dbg.json"),
            r#"{"_format":"hh-sol-dbg-1","buildInfo":"../../build-info/1.json"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("build-info")).unwrap();
        std::fs::write(dir.path().join("build-info/InvoiceNFT.json"), "not an artifact").unwrap();
        dir
    }

    #[test]
    fn resolves_bare_name() {
        let dir = project();
        let artifact = Artifacts::new(dir.path()).resolve("InvoiceNFT").unwrap();

        assert_eq!(artifact.contract_name, "InvoiceNFT");
        assert_eq!(
            artifact.fully_qualified_name(),
            "contracts/InvoiceNFT.sol:InvoiceNFT"
        );
        assert_eq!(artifact.bytecode.as_ref(), [0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.abi.constructor.unwrap().inputs.len(), 1);
    }

    #[test]
    fn resolves_fully_qualified_name() {
        let dir = project();
        let artifacts = Artifacts::new(dir.path());

        let artifact = artifacts
            .resolve("contracts/InvoiceNFT.sol:InvoiceNFT")
            .unwrap();
        assert_eq!(artifact.contract_name, "InvoiceNFT");

        assert!(matches!(
            artifacts.resolve("contracts/Other.sol:InvoiceNFT"),
            Err(ArtifactError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_contract_is_not_found() {
        let dir = project();
        let err = Artifacts::new(dir.path()).resolve("Invoice").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(name) if name == "Invoice"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = Artifacts::new(dir.path().join("artifacts"))
            .resolve("InvoiceNFT")
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Directory { .. }));
    }

    #[test]
    fn duplicate_name_is_ambiguous() {
        let dir = project();
        write(
            dir.path(),
            "contracts/legacy/InvoiceNFT.sol",
            artifact(
                "contracts/legacy/InvoiceNFT.sol",
                "InvoiceNFT",
                &[],
                CREATION_CODE,
            ),
        );

        let err = Artifacts::new(dir.path()).resolve("InvoiceNFT").unwrap_err();
        let ArtifactError::Ambiguous { candidates, .. } = err else {
            panic!("unexpected error");
        };
        assert_eq!(
            candidates,
            vec![
                "contracts/InvoiceNFT.sol:InvoiceNFT",
                "contracts/legacy/InvoiceNFT.sol:InvoiceNFT",
            ]
        );
    }

    #[test]
    fn abstract_contract_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/IInvoice.sol",
            artifact("contracts/IInvoice.sol", "IInvoice", &[], "0x"),
        );

        let err = Artifacts::new(dir.path()).resolve("IInvoice").unwrap_err();
        assert!(matches!(err, ArtifactError::Abstract(_)));
    }

    #[test]
    fn unlinked_libraries_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut linked = artifact(
            "contracts/Registry.sol",
            "Registry",
            &[],
            "0x73__$d1fc1d4cd6c2b5b5b2b0a1eb4d5bd0f9a6$__6080",
        );
        linked["linkReferences"] = json!({
            "contracts/Lib.sol": { "Lib": [{ "length": 20, "start": 1 }] }
        });
        write(dir.path(), "contracts/Registry.sol", linked);

        let err = Artifacts::new(dir.path()).resolve("Registry").unwrap_err();
        let ArtifactError::UnlinkedLibraries { libraries, .. } = err else {
            panic!("unexpected error");
        };
        assert_eq!(libraries, vec!["contracts/Lib.sol:Lib"]);
    }

    #[test]
    fn appends_encoded_constructor_arguments() {
        let dir = project();
        let artifact = Artifacts::new(dir.path()).resolve("InvoiceNFT").unwrap();

        let code = artifact
            .deploy_code(&["0xf08a50178dfcde18524640ea6618a1f965821715".to_string()])
            .unwrap();

        assert_eq!(code.len(), 5 + 32);
        assert_eq!(&code[..5], artifact.bytecode.as_ref());
        assert_eq!(&code[5..17], [0; 12]);
        assert_eq!(
            &code[17..],
            address!("f08a50178dfcde18524640ea6618a1f965821715").as_slice()
        );
    }

    #[test]
    fn string_arguments_are_passed_verbatim() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/Memo.sol",
            artifact("contracts/Memo.sol", "Memo", &["string", "uint256"], CREATION_CODE),
        );
        let artifact = Artifacts::new(dir.path()).resolve("Memo").unwrap();
        let literal = "0xf08a50178dfcde18524640ea6618a1f96582171500";

        let code = artifact
            .deploy_code(&[literal.to_string(), "42".to_string()])
            .unwrap();

        let expected = DynSolValue::Tuple(vec![
            DynSolValue::String(literal.to_string()),
            DynSolValue::Uint(U256::from(42), 256),
        ])
        .abi_encode_params();
        assert_eq!(&code[5..], expected.as_slice());
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let dir = project();
        let artifact = Artifacts::new(dir.path()).resolve("InvoiceNFT").unwrap();

        let err = artifact.deploy_code(&[]).unwrap_err();
        assert!(matches!(
            err,
            ArgumentError::Count {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn rejects_overlong_address() {
        let dir = project();
        let artifact = Artifacts::new(dir.path()).resolve("InvoiceNFT").unwrap();

        let err = artifact
            .deploy_code(&["0xf08a50178dfcde18524640ea6618a1f96582171500".to_string()])
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { position: 0, ty, .. } if ty == "address"));
    }

    #[test]
    fn contract_without_constructor_takes_no_arguments() {
        let dir = TempDir::new().unwrap();
        let mut plain = artifact("contracts/Plain.sol", "Plain", &[], CREATION_CODE);
        plain["abi"] = json!([]);
        write(dir.path(), "contracts/Plain.sol", plain);
        let artifact = Artifacts::new(dir.path()).resolve("Plain").unwrap();

        assert_eq!(artifact.deploy_code(&[]).unwrap(), artifact.bytecode);
        assert!(matches!(
            artifact.deploy_code(&["1".to_string()]),
            Err(ArgumentError::Count {
                expected: 0,
                actual: 1
            })
        ));
    }
}
