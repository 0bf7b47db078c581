//! CLI command bodies, generic over the store so they run against any
//! [`DocumentStore`].

use std::io::Write;

use serde::Serialize;

use crate::{
    cli::{ImportArgs, IndexArgs, SearchArgs},
    context::CallContext,
    document::{Document, Pagination},
    error::Result,
    store::DocumentStore,
    verifier::Verifier,
};

#[derive(Debug, Serialize)]
struct SearchOutput<'a> {
    #[serde(flatten)]
    pagination: Pagination,
    documents: &'a [Document],
}

pub async fn search<S, W>(
    store: &S,
    ctx: &CallContext,
    args: &SearchArgs,
    out: &mut W,
) -> Result<Pagination>
where
    S: DocumentStore,
    W: Write,
{
    let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    let mut pagination = Pagination::new(args.page, args.page_size);

    let documents: Vec<Document> = store
        .find(ctx, &args.collection, &fields, &args.query, &mut pagination)
        .await?;

    if args.json {
        let output = SearchOutput {
            pagination,
            documents: &documents,
        };
        serde_json::to_writer(&mut *out, &output)?;
        writeln!(out)?;
        return Ok(pagination);
    }

    if documents.is_empty() {
        writeln!(out, "No documents match '{}'", args.query)?;
        return Ok(pagination);
    }

    for doc in &documents {
        writeln!(out, "{}\t{}", doc.id, doc.title)?;
        if !doc.keywords.is_empty() {
            writeln!(out, "\t[{}]", doc.keywords.join(", "))?;
        }
    }

    let pages = match pagination.page_size {
        0 => 1,
        size => pagination.total_documents.div_ceil(size).max(1),
    };
    writeln!(
        out,
        "\nPage {} of {pages} ({} match(es))",
        pagination.page, pagination.total_documents
    )?;
    Ok(pagination)
}

pub async fn import<S, W>(
    store: &S,
    ctx: &CallContext,
    verifier: &Verifier,
    args: &ImportArgs,
    out: &mut W,
) -> Result<()>
where
    S: DocumentStore,
    W: Write,
{
    let text = std::fs::read_to_string(&args.file)?;
    let documents: Vec<Document> = serde_json::from_str(&text)?;
    verifier.check_all(&documents)?;

    let result = store
        .upsert_batch(ctx, &args.collection, &documents)
        .await?;

    writeln!(
        out,
        "Imported {} document(s) into '{}': {} matched, {} modified, {} upserted",
        documents.len(),
        args.collection,
        result.matched,
        result.modified,
        result.upserted
    )?;
    Ok(())
}

pub async fn index<S, W>(
    store: &S,
    ctx: &CallContext,
    args: &IndexArgs,
    out: &mut W,
) -> Result<()>
where
    S: DocumentStore,
    W: Write,
{
    let spec = args.spec();
    store.create_index(ctx, &args.collection, &spec).await?;
    writeln!(
        out,
        "Created index '{}' on '{}'",
        spec.resolved_name(),
        args.collection
    )?;
    Ok(())
}
