//! Static file serving module
//!
//! `StaticSite::serve` is the whole request pipeline for one path:
//! Decode -> Normalize -> Guard -> Lookup -> Dispatch (file | directory | error).

use hyper::Response;
use std::path::Path;

use crate::config::SiteConfig;
use crate::error::StartupError;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, FileBody, ServeBody};
use crate::logger;
use crate::resolve::{decode_path, Entry, RelativePath, Resolver};

/// One served directory tree, immutable after construction
#[derive(Debug, Clone)]
pub struct StaticSite {
    resolver: Resolver,
    directory_listing: bool,
    redirect_code: u16,
    chunk_size: usize,
}

impl StaticSite {
    pub fn new(site: &SiteConfig, chunk_size: usize) -> Result<Self, StartupError> {
        Ok(Self {
            resolver: Resolver::new(&site.root, site.index_files.clone())?,
            directory_listing: site.directory_listing,
            redirect_code: site.redirect_code,
            chunk_size,
        })
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Produce the response for one GET/HEAD request
    pub async fn serve(&self, ctx: &RequestContext<'_>) -> Response<ServeBody> {
        let decoded = match decode_path(ctx.path) {
            Ok(d) => d,
            Err(e) => {
                logger::log_warning(&format!("Bad request path '{}': {e}", ctx.path));
                return http::build_400_response(ctx.is_head);
            }
        };

        let Ok(rel) = RelativePath::normalize(&decoded) else {
            logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
            return http::build_403_response(ctx.is_head);
        };

        // An empty path names the root itself, as `/` does.
        let wants_dir = decoded.is_empty() || decoded.ends_with('/');

        match self.resolver.lookup(&rel).await {
            Entry::Directory { path } => {
                if wants_dir {
                    self.serve_directory(ctx, &rel, &path).await
                } else {
                    self.redirect(ctx, &rel, true)
                }
            }
            Entry::File { size, handle } => {
                if wants_dir {
                    // `/file.txt/` -> `/file.txt`
                    return self.redirect(ctx, &rel, false);
                }
                if rel.file_name() == self.resolver.index_files().first().map(String::as_str) {
                    // `/dir/index.html` -> `/dir/`, the URL that serves the same file
                    return self.redirect(ctx, &rel.parent(), true);
                }
                let name = rel.file_name().unwrap_or_default();
                self.serve_file(ctx, Path::new(name), size, handle)
            }
            other => error_response(ctx, other),
        }
    }

    async fn serve_directory(
        &self,
        ctx: &RequestContext<'_>,
        rel: &RelativePath,
        dir: &Path,
    ) -> Response<ServeBody> {
        match self.resolver.find_index(dir).await {
            Some((name, Entry::File { size, handle })) => {
                self.serve_file(ctx, Path::new(name), size, handle)
            }
            Some((_, other)) => error_response(ctx, other),
            None if self.directory_listing => match listing::read_entries(dir).await {
                Ok(entries) => {
                    let mut title = rel.display();
                    if !rel.is_root() {
                        title.push('/');
                    }
                    http::build_html_response(listing::render(&title, &entries), ctx.is_head)
                }
                Err(e) => error_response(ctx, e.into()),
            },
            None => http::build_403_response(ctx.is_head),
        }
    }

    fn serve_file(
        &self,
        ctx: &RequestContext<'_>,
        name: &Path,
        size: u64,
        handle: tokio::fs::File,
    ) -> Response<ServeBody> {
        let content_type = mime::content_type_for(name);
        let body = FileBody::new(handle, size, self.chunk_size);
        http::build_file_response(body, size, content_type, ctx.is_head)
    }

    fn redirect(
        &self,
        ctx: &RequestContext<'_>,
        target: &RelativePath,
        trailing_slash: bool,
    ) -> Response<ServeBody> {
        let mut location = target.to_url(trailing_slash);
        if let Some(query) = ctx.query {
            location.push('?');
            location.push_str(query);
        }
        http::build_redirect_response(&location, self.redirect_code, ctx.is_head)
    }
}

fn error_response(ctx: &RequestContext<'_>, entry: Entry) -> Response<ServeBody> {
    match entry {
        Entry::PermissionDenied => http::build_403_response(ctx.is_head),
        Entry::Outside => {
            logger::log_warning(&format!(
                "Path resolves outside root, blocked: {}",
                ctx.path
            ));
            http::build_404_response(ctx.is_head)
        }
        Entry::Failed(e) => {
            logger::log_error(&format!("Failed to open '{}': {e}", ctx.path));
            http::build_500_response(ctx.is_head)
        }
        Entry::NotFound | Entry::File { .. } | Entry::Directory { .. } => {
            http::build_404_response(ctx.is_head)
        }
    }
}
