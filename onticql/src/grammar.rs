use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "onticql.pest"]
pub struct OnticqlParser;
