use crate::util;
use crate::EbuildServer;
use crosscope_core::parser::{parse_ebuild, vocabulary};
use crosscope_core::resolver;
use crosscope_core::source;
use std::path::Path;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

pub async fn hover(server: &EbuildServer, params: HoverParams) -> Result<Option<Hover>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let Some(document) = server.documents.get(&uri) else {
        return Ok(None);
    };
    if document.language != "ebuild" {
        return Ok(None);
    }
    let content = document.content.clone();
    drop(document);

    let checkout = uri
        .to_file_path()
        .ok()
        .and_then(|path| server.checkout_for(&path));

    Ok(build_hover(
        &content,
        util::to_core_position(&content, position),
        checkout.as_deref(),
    ))
}

fn build_hover(content: &str, position: source::Position, checkout: Option<&Path>) -> Option<Hover> {
    let parsed = match parse_ebuild(content) {
        Ok(parsed) => parsed,
        Err(err) => {
            // Mid-edit documents fail structurally all the time; that means
            // "annotate nothing", never an error to surface.
            tracing::trace!(%err, "skipping hover on unparsable document");
            return None;
        }
    };

    if let Some(assignment) = parsed.assignment_at(position) {
        let doc = vocabulary::variable_doc(&assignment.name)?;
        return Some(markdown_hover(
            format!("**{}**\n\n{}", doc.name, doc.doc),
            util::to_lsp_range(content, assignment.name_range),
        ));
    }

    if let Some(inherit) = parsed.inherit_at(position) {
        let text = match checkout.and_then(|root| resolver::resolve_eclass(root, &inherit.name)) {
            Some(path) => format!("**{}.eclass**\n\n`{}`", inherit.name, path.display()),
            None => format!("**{}.eclass**\n\n*Not found in any overlay*", inherit.name),
        };
        return Some(markdown_hover(
            text,
            util::to_lsp_range(content, inherit.range),
        ));
    }

    // Phase functions live in shell code the parser skips, so fall back to
    // the raw word under the cursor.
    let (word, range) = util::word_at(content, position)?;
    let doc = vocabulary::phase_doc(&word)?;
    Some(markdown_hover(
        format!("**{}**\n\n{}", doc.name, doc.doc),
        util::to_lsp_range(content, range),
    ))
}

fn markdown_hover(text: String, range: Range) -> Hover {
    Hover {
        contents: HoverContents::Scalar(MarkedString::String(text)),
        range: Some(range),
    }
}
