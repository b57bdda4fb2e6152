//! Recipe and source tree fixtures.

use std::path::{Path, PathBuf};

use crate::core::recipe::Recipe;

/// The reference dotenv recipe.
pub const DOTENV_RECIPE: &str = include_str!("../../recipes/dotenv/Galley.toml");

/// Minimal CMake project matching the reference recipe.
pub const CMAKE_LISTS: &str = r#"cmake_minimum_required(VERSION 3.16)
project(dotenv VERSION 2.0.0 LANGUAGES CXX)
add_library(dotenv_lib src/dotenv.cpp)
target_include_directories(dotenv_lib PUBLIC include)
install(TARGETS dotenv_lib)
install(DIRECTORY include/ DESTINATION include)
"#;

/// Parse the reference recipe as if it lived in `/recipes/dotenv`.
pub fn dotenv_recipe() -> Recipe {
    Recipe::parse(DOTENV_RECIPE, Path::new("/recipes/dotenv/Galley.toml")).unwrap()
}

/// Write a dotenv-like source tree under `base` and return its root.
pub fn source_tree(base: &Path) -> PathBuf {
    let root = base.join("dotenv-src");
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::create_dir_all(root.join("include")).unwrap();
    std::fs::write(root.join("CMakeLists.txt"), CMAKE_LISTS).unwrap();
    std::fs::write(root.join("LICENSE"), "MIT License\n\nCopyright (c) dotenv-cpp team\n")
        .unwrap();
    std::fs::write(
        root.join("include/dotenv.hpp"),
        "#pragma once\nnamespace dotenv { inline void load() {} }\n",
    )
    .unwrap();
    std::fs::write(root.join("src/dotenv.cpp"), "#include <dotenv.hpp>\n").unwrap();
    root
}
