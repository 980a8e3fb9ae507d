mod binding;
mod builder;
