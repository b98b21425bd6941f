use tugwalk::visitor;

struct Broken;

#[visitor(mode = prefix)]
impl Broken {
    #[prefix]
    fn enter(&mut self, node: &_) {}
}

fn main() {
    let _ = Broken;
}
