//! # Recipe schema demo
//!
//! Builds the parameter tree of a `save_recipe` function (an array of
//! ingredient objects, a list of steps and a cooking time) and prints the
//! `functions` and `tools` request fragments a chat-completion request
//! would carry.
//!
//! ```text
//! cargo run -p demos --example recipe
//! RUST_LOG=debug cargo run -p demos --example recipe
//! ```

use funcall_rs::prelude::*;

fn recipe_params() -> Params {
    Params(vec![
        Param::array(
            "ingredients",
            Param::object(
                "",
                [
                    Param::string("name").required(),
                    Param::string("unit")
                        .description("grams, ml, cups, pieces or teaspoons")
                        .required(),
                    Param::number("amount").required(),
                ],
            ),
        )
        .required(),
        Param::array("instructions", Param::item(ParamType::String))
            .description("Steps to prepare the recipe (no numbering)")
            .required(),
        Param::number("time_to_cook")
            .description("Total time to prepare the recipe in minutes")
            .required(),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    demos::init_tracing();

    let mut funcs = Funcs::new();
    funcs
        .insert(
            "save_recipe",
            Func::new("Store a structured recipe", recipe_params()),
        )?
        .insert(
            "list_recipes",
            Func::new("List stored recipe titles", Params::new()),
        )?;

    tracing::info!(functions = funcs.len(), "registry built");

    println!("── functions ──");
    println!("{}", serde_json::to_string_pretty(&funcs.encode()?)?);

    println!("── tools ──");
    println!("{}", serde_json::to_string_pretty(&funcs.tools()?)?);

    // Read the schema back as plain declarations.
    let decls: Vec<FunctionDecl> = as_shape(&funcs)?;
    for decl in &decls {
        println!("{}: {} top-level parameter(s)", decl.name, decl.parameters.len());
    }

    Ok(())
}
