//! # Dispatch demo
//!
//! Registers two handlers, then feeds the dispatcher the kind of
//! `function_call` objects a model returns: a name plus the arguments as a
//! JSON *string*. One call targets a schema-only entry and one an unknown
//! name, to show the errors.

use funcall_rs::prelude::*;
use serde::Deserialize;

#[derive(Deserialize)]
struct RepeatArgs {
    word: String,
    count: usize,
}

#[derive(Deserialize)]
struct DivideArgs {
    dividend: f64,
    divisor: f64,
}

fn registry() -> Result<Funcs, RegistryError> {
    let mut funcs = Funcs::new();
    funcs
        .insert(
            "repeat",
            Func::new(
                "Repeat given string N times",
                vec![
                    Param::string("word")
                        .description("String to be repeated")
                        .required(),
                    Param::of::<usize>("count")
                        .description("How many times to repeat")
                        .required(),
                ],
            )
            .with_value(Callable::sync(|a: RepeatArgs| a.word.repeat(a.count))),
        )?
        .insert(
            "divide",
            Func::new(
                "Divide two numbers",
                vec![
                    Param::of::<f64>("dividend").required(),
                    Param::of::<f64>("divisor").required(),
                ],
            )
            .with_value(Callable::try_new(|a: DivideArgs| async move {
                if a.divisor == 0.0 {
                    Err("division by zero")
                } else {
                    Ok(a.dividend / a.divisor)
                }
            })),
        )?
        .insert(
            "weather",
            Func::new(
                "Current weather (schema only)",
                vec![Param::string("city").required()],
            ),
        )?;
    Ok(funcs)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    demos::init_tracing();

    let funcs = registry()?;
    println!("{}", serde_json::to_string_pretty(&funcs)?);

    let dispatcher = Dispatcher::new(&funcs);
    let calls = [
        FunctionCall::new("repeat", r#"{"word":"ha","count":3}"#),
        FunctionCall::new("divide", r#"{"dividend":1,"divisor":8}"#),
        FunctionCall::new("divide", r#"{"dividend":1,"divisor":0}"#),
        FunctionCall::new("weather", r#"{"city":"Lisbon"}"#),
        FunctionCall::new("translate", "{}"),
    ];

    for call in calls {
        let name = call.name.clone();
        match dispatcher.call(call).await {
            Ok(result) => println!("{name} → {result}"),
            Err(err) => tracing::warn!(%name, %err, "call failed"),
        }
    }

    Ok(())
}
