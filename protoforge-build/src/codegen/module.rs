//! Output files: one per package plus a `mod.rs` that nests them.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;

use crate::naming;
use crate::Error;

use super::GeneratedFile;

/// First line of every generated file.
const HEADER: &str = "// @generated by protoforge-build. DO NOT EDIT.\n\n";

/// How `mod.rs` refers to the package files next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeStyle {
    /// `include!(concat!(env!("OUT_DIR"), "/pkg.rs"))`, for output in `$OUT_DIR`.
    OutDir,
    /// `include!("pkg.rs")`, for output in a source directory.
    Relative,
}

/// File name for the code of `package`.
pub fn package_file_name(package: &str) -> String {
    if package.is_empty() {
        "_.rs".to_string()
    } else {
        format!("{package}.rs")
    }
}

/// Render the package files and `mod.rs`.
pub fn render_files(
    packages: BTreeMap<String, TokenStream>,
    skip_format: bool,
    include: IncludeStyle,
) -> Result<Vec<GeneratedFile>, Error> {
    let mut files = Vec::with_capacity(packages.len() + 1);
    let mut root = ModuleNode::default();

    for (package, tokens) in packages {
        let name = package_file_name(&package);
        root.insert(&package, name.clone());
        files.push(GeneratedFile {
            content: render(tokens, skip_format)?,
            name,
        });
    }

    files.push(GeneratedFile {
        name: "mod.rs".to_string(),
        content: render(root.to_tokens(include), skip_format)?,
    });
    Ok(files)
}

fn render(tokens: TokenStream, skip_format: bool) -> Result<String, Error> {
    let body = if skip_format {
        tokens.to_string()
    } else {
        let file: syn::File =
            syn::parse2(tokens).map_err(|err| Error::SynParse(err.to_string()))?;
        prettyplease::unparse(&file)
    };
    Ok(format!("{HEADER}{body}"))
}

/// A package module and the file holding its own items.
#[derive(Debug, Default)]
struct ModuleNode {
    file: Option<String>,
    children: BTreeMap<String, ModuleNode>,
}

impl ModuleNode {
    fn insert(&mut self, package: &str, file: String) {
        let mut node = self;
        for segment in package.split('.').filter(|segment| !segment.is_empty()) {
            node = node
                .children
                .entry(naming::module_name(segment))
                .or_default();
        }
        node.file = Some(file);
    }

    fn to_tokens(&self, include: IncludeStyle) -> TokenStream {
        let file = self.file.as_ref().map(|file| match include {
            IncludeStyle::OutDir => {
                let path = format!("/{file}");
                quote!(include!(concat!(env!("OUT_DIR"), #path));)
            }
            IncludeStyle::Relative => quote!(include!(#file);),
        });
        let children = self.children.iter().map(|(name, child)| {
            let ident = naming::ident(name);
            let body = child.to_tokens(include);
            quote! {
                pub mod #ident {
                    #body
                }
            }
        });
        quote! {
            #file
            #(#children)*
        }
    }
}
