//! pkg-deps - bundle packages and their dependencies for offline use
//!
//! pkg-deps downloads a named package (or the dependencies a project
//! declares) together with its whole transitive closure into a flat local
//! directory. It does no resolution of its own: each ecosystem's package
//! manager does the resolving and fetching, and pkg-deps prepares manifests,
//! repository configuration and credentials for it and normalizes the result.
//!
//! # Architecture Overview
//!
//! - the CLI parses a package-type subcommand into a [`bundler::BundleRequest`]
//! - the [`bundler::Bundler`] merges configured repository defaults, resolves
//!   the bundle directory and picks the handler
//! - a [`handlers::PackageHandler`] runs the shared lifecycle (prepare the
//!   output directory, fetch, normalize) for one ecosystem
//!
//! ## Supported Ecosystems
//!
//! | Type | Tool | Bundle contents | Workspace manifest |
//! |------|------|-----------------|--------------------|
//! | `npm` | `npm` | `.tgz` tarballs | `package.json` |
//! | `pip` | `pip` | wheels and sdists | `requirements.txt` |
//! | `maven` | `mvn` | JARs and POMs | `pom.xml` |
//! | `nuget` | `nuget` | `.nupkg` files | `packages.config` |
//! | `docker` | `docker` | image archive (`.tar`) | - |
//! | `apk` | `apk` | `.apk` files | - |
//!
//! # Core Modules
//!
//! - [`bundler`] - request normalization and dispatch
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration (`~/.pkg-deps/config.toml`)
//! - [`core`] - error types and the package type enum
//! - [`handlers`] - the six ecosystem backends and their lifecycle
//! - [`utils`] - command execution, URL credentials, HTTP and file helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Bundle a package at a specific version
//! pkg-deps npm -p express -v 4.18.2
//!
//! # Bundle a Maven artifact from an internal mirror
//! pkg-deps maven -p org.slf4j:slf4j-api -r https://nexus.example.com/maven -u ci -P "$TOKEN"
//!
//! # Bundle everything a project depends on
//! pkg-deps pip -w ./service
//!
//! # Save a container image
//! pkg-deps docker -p nginx -v 1.27 -o ./images
//! ```

pub mod bundler;
pub mod cli;
pub mod config;
pub mod core;
pub mod handlers;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
