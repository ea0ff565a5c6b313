pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
    fn current_route(&self) -> String;
}
